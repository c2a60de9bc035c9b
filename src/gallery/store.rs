use super::catalog::{Catalog, ImageRef, ProjectId};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    pub fn offset(self) -> isize {
        match self {
            Self::Previous => -1,
            Self::Next => 1,
        }
    }

    /// Moves `index` one step around a ring of `len` slots.
    ///
    /// Returns `index` unchanged when `len` is zero.
    pub fn step(self, index: usize, len: usize) -> usize {
        if len == 0 {
            return index;
        }

        let len = len as isize;
        ((index as isize % len) + self.offset()).rem_euclid(len) as usize
    }
}

/// A navigation request: which project, which way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavCommand {
    pub project: ProjectId,
    pub direction: Direction,
}

impl NavCommand {
    pub fn new(project: ProjectId, direction: Direction) -> Self {
        Self { project, direction }
    }

    pub fn next(project: ProjectId) -> Self {
        Self::new(project, Direction::Next)
    }

    pub fn previous(project: ProjectId) -> Self {
        Self::new(project, Direction::Previous)
    }
}

/// Catalog plus the per-project cursor. Every cursor starts at zero and
/// always stays inside its project's image list.
#[derive(Clone, Debug, PartialEq)]
pub struct GalleryStore {
    catalog: Rc<Catalog>,
    current: HashMap<ProjectId, usize>,
}

impl GalleryStore {
    pub fn new(catalog: Catalog) -> Self {
        let current = catalog
            .projects()
            .map(|(project, _)| (project.clone(), 0))
            .collect();

        Self {
            catalog: Rc::new(catalog),
            current,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current_index(&self, project: &ProjectId) -> Option<usize> {
        self.current.get(project).copied()
    }

    pub fn current_image(&self, project: &ProjectId) -> Option<&ImageRef> {
        self.catalog.image(project, self.current_index(project)?)
    }

    /// Steps the project's cursor and returns the new index.
    ///
    /// Unknown projects are ignored and yield `None`.
    pub fn advance(&mut self, project: &ProjectId, direction: Direction) -> Option<usize> {
        let len = self.catalog.len(project)?;
        let index = self.current.get_mut(project)?;
        *index = direction.step(*index, len);
        Some(*index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> GalleryStore {
        let catalog = Catalog::from_entries([
            ("fumart", vec!["f1.png", "f2.png"]),
            ("poster", vec!["p1.png"]),
            ("trio", vec!["t1.png", "t2.png", "t3.png"]),
        ])
        .expect("valid catalog");
        GalleryStore::new(catalog)
    }

    #[test]
    fn step_wraps_in_both_directions() {
        assert_eq!(Direction::Next.step(2, 3), 0);
        assert_eq!(Direction::Previous.step(0, 3), 2);
        assert_eq!(Direction::Next.step(0, 1), 0);
        assert_eq!(Direction::Previous.step(0, 1), 0);
        assert_eq!(Direction::Next.step(4, 0), 4);
    }

    #[test]
    fn step_moves_by_the_direction_offset() {
        for direction in [Direction::Previous, Direction::Next] {
            let stepped = direction.step(2, 5) as isize;
            assert_eq!(stepped - 2, direction.offset());
        }
    }

    #[test]
    fn cursors_start_at_zero() {
        let store = store();

        for (project, _) in store.catalog().projects() {
            assert_eq!(store.current_index(project), Some(0));
        }
    }

    #[test]
    fn next_wraps_back_to_first_image() {
        let mut store = store();
        let fumart = ProjectId::from("fumart");

        assert_eq!(store.advance(&fumart, Direction::Next), Some(1));
        assert_eq!(
            store.current_image(&fumart).map(ImageRef::as_str),
            Some("f2.png")
        );
        assert_eq!(store.advance(&fumart, Direction::Next), Some(0));
        assert_eq!(
            store.current_image(&fumart).map(ImageRef::as_str),
            Some("f1.png")
        );
    }

    #[test]
    fn previous_from_first_image_lands_on_last() {
        let mut store = store();
        let trio = ProjectId::from("trio");

        assert_eq!(store.advance(&trio, Direction::Previous), Some(2));
    }

    #[test]
    fn single_image_project_stays_on_first_image() {
        let mut store = store();
        let poster = ProjectId::from("poster");

        assert_eq!(store.advance(&poster, Direction::Next), Some(0));
        assert_eq!(store.advance(&poster, Direction::Previous), Some(0));
    }

    #[test]
    fn unknown_project_is_ignored() {
        let mut store = store();
        let before = store.clone();

        assert_eq!(store.advance(&ProjectId::from("missing"), Direction::Next), None);
        assert_eq!(store, before);
    }

    #[test]
    fn projects_move_independently() {
        let mut store = store();
        let trio = ProjectId::from("trio");
        let fumart = ProjectId::from("fumart");

        store.advance(&trio, Direction::Next);
        store.advance(&trio, Direction::Next);

        assert_eq!(store.current_index(&trio), Some(2));
        assert_eq!(store.current_index(&fumart), Some(0));

        store.advance(&fumart, Direction::Previous);
        assert_eq!(store.current_index(&trio), Some(2));
        assert_eq!(store.current_index(&fumart), Some(1));
    }
}
