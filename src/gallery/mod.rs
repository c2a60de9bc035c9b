//! Project image galleries: one cursor per project, shown both inline on the
//! page and in a single full-screen modal.
//!
//! Every view is derived from [`GalleryStore`], so the inline widget and the
//! modal can never show different images for the same project.

mod catalog;
mod inline;
mod modal;
mod store;

pub use catalog::{Catalog, CatalogError, ImageRef, ProjectId};
pub use inline::{InlineFrame, InlineRegistry, InlineSlot};
pub use modal::{ClickTarget, CloseTrigger, ModalFrame, ModalViewer, NavControl, ESCAPE_KEY};
pub use store::{Direction, GalleryStore, NavCommand};

/// A UI command for [`Gallery::dispatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GalleryAction {
    Navigate(NavCommand),
    OpenModal(ProjectId),
    CloseModal(CloseTrigger),
}

/// Views to repaint after a navigation step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GalleryRefresh {
    pub index: usize,
    pub inline: Option<InlineFrame>,
    /// Only set when the modal is open on the navigated project.
    pub modal: Option<ModalFrame>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Gallery {
    store: GalleryStore,
    inline: InlineRegistry,
    modal: ModalViewer,
}

impl Gallery {
    pub fn new(catalog: Catalog, inline: InlineRegistry) -> Self {
        Self {
            store: GalleryStore::new(catalog),
            inline,
            modal: ModalViewer::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.store.catalog()
    }

    pub fn inline_registry(&self) -> &InlineRegistry {
        &self.inline
    }

    pub fn current_index(&self, project: &ProjectId) -> Option<usize> {
        self.store.current_index(project)
    }

    pub fn next(&mut self, project: &ProjectId) -> Option<GalleryRefresh> {
        self.navigate(&NavCommand::next(project.clone()))
    }

    pub fn previous(&mut self, project: &ProjectId) -> Option<GalleryRefresh> {
        self.navigate(&NavCommand::previous(project.clone()))
    }

    /// Steps a project's cursor and reports what both views must now show.
    pub fn navigate(&mut self, command: &NavCommand) -> Option<GalleryRefresh> {
        let index = self.store.advance(&command.project, command.direction)?;
        let inline = self.inline.render(&self.store, &command.project);
        let modal = if self.modal.active_project() == Some(&command.project) {
            self.modal.refresh(&self.store)
        } else {
            None
        };

        Some(GalleryRefresh {
            index,
            inline,
            modal,
        })
    }

    pub fn inline_frame(&self, project: &ProjectId) -> Option<InlineFrame> {
        self.inline.render(&self.store, project)
    }

    pub fn open_modal(&mut self, project: &ProjectId) -> Option<ModalFrame> {
        self.modal.open(&self.store, project)
    }

    pub fn modal_frame(&self) -> Option<ModalFrame> {
        self.modal.refresh(&self.store)
    }

    pub fn close_modal(&mut self, trigger: CloseTrigger) -> bool {
        self.modal.close(trigger)
    }

    pub fn active_project(&self) -> Option<&ProjectId> {
        self.modal.active_project()
    }

    pub fn scroll_locked(&self) -> bool {
        self.modal.scroll_locked()
    }

    pub fn dispatch(&mut self, action: GalleryAction) {
        match action {
            GalleryAction::Navigate(command) => {
                self.navigate(&command);
            }
            GalleryAction::OpenModal(project) => {
                self.open_modal(&project);
            }
            GalleryAction::CloseModal(trigger) => {
                self.close_modal(trigger);
            }
        }
    }
}
