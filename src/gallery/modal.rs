use super::catalog::ProjectId;
use super::store::{Direction, GalleryStore, NavCommand};

pub const ESCAPE_KEY: &str = "Escape";

/// Where a click inside the modal landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickTarget {
    /// The overlay itself, outside the image.
    Backdrop,
    Content,
}

impl ClickTarget {
    /// Classifies a click by the element it landed on. Only a click whose
    /// target is the overlay element itself counts as a backdrop click.
    pub fn classify<T: PartialEq>(target: Option<&T>, overlay: Option<&T>) -> Self {
        match (target, overlay) {
            (Some(target), Some(overlay)) if target == overlay => Self::Backdrop,
            _ => Self::Content,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseTrigger {
    Click(ClickTarget),
    Escape,
    Programmatic,
}

impl CloseTrigger {
    pub fn from_key(key: &str) -> Option<Self> {
        (key == ESCAPE_KEY).then_some(Self::Escape)
    }

    fn closes(self) -> bool {
        !matches!(self, Self::Click(ClickTarget::Content))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavControl {
    pub direction: Direction,
    pub label: &'static str,
    pub command: NavCommand,
}

impl NavControl {
    fn new(project: &ProjectId, direction: Direction) -> Self {
        let label = match direction {
            Direction::Previous => "❮",
            Direction::Next => "❯",
        };

        Self {
            direction,
            label,
            command: NavCommand::new(project.clone(), direction),
        }
    }

    pub fn aria_label(&self) -> &'static str {
        match self.direction {
            Direction::Previous => "Previous image",
            Direction::Next => "Next image",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModalFrame {
    pub project: ProjectId,
    pub src: String,
    pub alt: String,
    /// 1-based.
    pub current: usize,
    pub total: usize,
    pub controls: Vec<NavControl>,
}

impl ModalFrame {
    pub fn counter_text(&self) -> String {
        format!("{}/{}", self.current, self.total)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum ModalState {
    #[default]
    Closed,
    Open {
        project: ProjectId,
        controls: Vec<NavControl>,
    },
}

/// The single full-screen viewer. Holds at most one open project.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModalViewer {
    state: ModalState,
}

impl ModalViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ModalState::Open { .. })
    }

    pub fn active_project(&self) -> Option<&ProjectId> {
        match &self.state {
            ModalState::Open { project, .. } => Some(project),
            ModalState::Closed => None,
        }
    }

    /// Page scrolling stays suppressed for exactly as long as the modal is open.
    pub fn scroll_locked(&self) -> bool {
        self.is_open()
    }

    /// Opens (or re-targets) the viewer on `project`.
    ///
    /// A project missing from the catalog leaves the viewer untouched.
    pub fn open(&mut self, store: &GalleryStore, project: &ProjectId) -> Option<ModalFrame> {
        let total = store.catalog().len(project)?;
        let controls = if total > 1 {
            vec![
                NavControl::new(project, Direction::Previous),
                NavControl::new(project, Direction::Next),
            ]
        } else {
            Vec::new()
        };

        self.state = ModalState::Open {
            project: project.clone(),
            controls,
        };
        self.refresh(store)
    }

    /// Re-reads the active project's cursor. `None` when closed.
    pub fn refresh(&self, store: &GalleryStore) -> Option<ModalFrame> {
        let ModalState::Open { project, controls } = &self.state else {
            return None;
        };

        let index = store.current_index(project)?;
        let image = store.current_image(project)?;
        let total = store.catalog().len(project)?;

        Some(ModalFrame {
            project: project.clone(),
            src: image.as_str().to_string(),
            alt: format!("{project} Image {}", index + 1),
            current: index + 1,
            total,
            controls: controls.clone(),
        })
    }

    /// Returns `true` if this call closed an open viewer.
    pub fn close(&mut self, trigger: CloseTrigger) -> bool {
        if !self.is_open() || !trigger.closes() {
            return false;
        }

        self.state = ModalState::Closed;
        true
    }
}
