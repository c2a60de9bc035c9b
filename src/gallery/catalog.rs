use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const BUNDLED_CATALOG: &str = include_str!("../../config/gallery.json");

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Opaque path or URI of one gallery image.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("gallery catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("gallery catalog has no projects")]
    Empty,
    #[error("gallery catalog has a blank project identifier")]
    BlankProjectId,
    #[error("project `{project}` is listed more than once")]
    DuplicateProject { project: String },
    #[error("project `{project}` has no images")]
    NoImages { project: String },
    #[error("project `{project}` has a blank image reference at position {position}")]
    BlankImage { project: String, position: usize },
}

/// Read-only mapping from project to its ordered, non-empty image list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    projects: BTreeMap<ProjectId, Vec<ImageRef>>,
}

impl Catalog {
    /// Parses and validates a JSON object of `project -> [image, ...]`.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let parsed: BTreeMap<String, Vec<String>> = serde_json::from_str(raw)?;
        Self::from_entries(parsed)
    }

    /// The catalog compiled into the binary from `config/gallery.json`.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn from_entries<P, I, S>(entries: impl IntoIterator<Item = (P, I)>) -> Result<Self, CatalogError>
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut projects = BTreeMap::new();

        for (project, images) in entries {
            let project = project.into().trim().to_string();
            if project.is_empty() {
                return Err(CatalogError::BlankProjectId);
            }

            let mut refs = Vec::new();
            for (position, image) in images.into_iter().enumerate() {
                let image = image.into();
                if image.trim().is_empty() {
                    return Err(CatalogError::BlankImage { project, position });
                }
                refs.push(ImageRef(image));
            }

            if refs.is_empty() {
                return Err(CatalogError::NoImages { project });
            }

            let project = ProjectId(project);
            if projects.contains_key(&project) {
                return Err(CatalogError::DuplicateProject { project: project.0 });
            }
            projects.insert(project, refs);
        }

        if projects.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Self { projects })
    }

    pub fn contains(&self, project: &ProjectId) -> bool {
        self.projects.contains_key(project)
    }

    pub fn images(&self, project: &ProjectId) -> Option<&[ImageRef]> {
        self.projects.get(project).map(Vec::as_slice)
    }

    pub fn len(&self, project: &ProjectId) -> Option<usize> {
        self.images(project).map(<[ImageRef]>::len)
    }

    pub fn image(&self, project: &ProjectId, index: usize) -> Option<&ImageRef> {
        self.images(project)?.get(index)
    }

    pub fn projects(&self) -> impl Iterator<Item = (&ProjectId, &[ImageRef])> {
        self.projects
            .iter()
            .map(|(project, images)| (project, images.as_slice()))
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }
}
