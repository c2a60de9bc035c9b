use super::catalog::ProjectId;
use super::store::GalleryStore;
use std::collections::BTreeMap;

/// Page content for one project card that embeds an inline gallery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineSlot {
    pub project: ProjectId,
    pub title: String,
    pub summary: String,
}

impl InlineSlot {
    pub fn new(project: &str, title: &str, summary: &str) -> Self {
        Self {
            project: ProjectId::from(project),
            title: title.to_string(),
            summary: summary.to_string(),
        }
    }
}

/// What an inline widget shows for its project right now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineFrame {
    pub project: ProjectId,
    pub src: String,
    pub alt: String,
    /// 1-based.
    pub current: usize,
    pub total: usize,
}

impl InlineFrame {
    pub fn counter_text(&self) -> String {
        self.current.to_string()
    }
}

/// The projects that have an inline widget on the page, fixed at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineRegistry {
    slots: BTreeMap<ProjectId, InlineSlot>,
    order: Vec<ProjectId>,
}

impl InlineRegistry {
    pub fn new(slots: impl IntoIterator<Item = InlineSlot>) -> Self {
        let mut registry = Self::default();

        for slot in slots {
            if !registry.slots.contains_key(&slot.project) {
                registry.order.push(slot.project.clone());
            }
            registry.slots.insert(slot.project.clone(), slot);
        }

        registry
    }

    pub fn slot(&self, project: &ProjectId) -> Option<&InlineSlot> {
        self.slots.get(project)
    }

    /// Slots in registration order.
    pub fn slots(&self) -> impl Iterator<Item = &InlineSlot> {
        self.order.iter().filter_map(|project| self.slots.get(project))
    }

    /// Returns `None` when the project has no widget here or is not in the catalog.
    pub fn render(&self, store: &GalleryStore, project: &ProjectId) -> Option<InlineFrame> {
        self.slot(project)?;

        let index = store.current_index(project)?;
        let image = store.current_image(project)?;
        let total = store.catalog().len(project)?;

        Some(InlineFrame {
            project: project.clone(),
            src: image.as_str().to_string(),
            alt: format!("{project} Image {}", index + 1),
            current: index + 1,
            total,
        })
    }
}
