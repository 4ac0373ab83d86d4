//! Registry of launch files already parsed in a run

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::model::FileId;

/// Paths parsed so far, mapped to the entity built for them
///
/// A registry lives exactly as long as one resolution run. Entries are only
/// removed when the entities they point at are discarded.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    visited: HashMap<PathBuf, FileId>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a path. Returns false if it was already recorded, in which
    /// case the existing entry is kept.
    pub fn mark(&mut self, path: &Path, id: FileId) -> bool {
        if self.visited.contains_key(path) {
            return false;
        }
        self.visited.insert(path.to_path_buf(), id);
        true
    }

    /// Drop every entry pointing at `first` or a later entity
    pub fn forget_from(&mut self, first: FileId) {
        self.visited.retain(|_, id| *id < first);
    }

    pub fn was_visited(&self, path: &Path) -> bool {
        self.visited.contains_key(path)
    }

    /// Entity recorded for a path
    pub fn get(&self, path: &Path) -> Option<FileId> {
        self.visited.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_records_once() {
        let mut registry = VisitedRegistry::new();
        let path = Path::new("pkg/launch/a.launch");
        assert!(!registry.was_visited(path));
        assert!(registry.mark(path, FileId(0)));
        assert!(!registry.mark(path, FileId(7)));
        assert!(registry.was_visited(path));
        assert_eq!(registry.get(path), Some(FileId(0)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_forget_from_drops_later_entities() {
        let mut registry = VisitedRegistry::new();
        registry.mark(Path::new("a/launch/root.launch"), FileId(0));
        registry.mark(Path::new("a/launch/broken.launch"), FileId(1));
        registry.mark(Path::new("b/launch/child.launch"), FileId(2));
        registry.forget_from(FileId(1));
        assert_eq!(registry.get(Path::new("a/launch/root.launch")), Some(FileId(0)));
        assert!(!registry.was_visited(Path::new("a/launch/broken.launch")));
        assert!(!registry.was_visited(Path::new("b/launch/child.launch")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registries_are_independent() {
        let mut first = VisitedRegistry::new();
        let second = VisitedRegistry::new();
        first.mark(Path::new("a/launch/x.launch"), FileId(0));
        assert!(!second.was_visited(Path::new("a/launch/x.launch")));
        assert!(second.is_empty());
    }
}
