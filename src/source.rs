use std::collections::HashMap;

/// Interns file paths and hands out stable, monotonically increasing file
/// IDs starting at 0. Registering the same path twice returns the first ID,
/// which is what makes `import`/`load` dedup silent.
#[derive(Debug, Default)]
pub struct SourceManager {
    paths: Vec<String>,
    ids: HashMap<String, usize>,
}

impl SourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_source_path(&mut self, path: &str) -> usize {
        if let Some(id) = self.ids.get(path) {
            return *id;
        }
        let id = self.paths.len();
        self.paths.push(path.to_owned());
        self.ids.insert(path.to_owned(), id);
        id
    }

    pub fn is_path_registered(&self, path: &str) -> bool {
        self.ids.contains_key(path)
    }

    pub fn resolve_source_path(&self, id: usize) -> &str {
        &self.paths[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_stable_and_deduplicated() {
        let mut manager = SourceManager::new();
        let a = manager.register_source_path("/tmp/a.amun");
        let b = manager.register_source_path("/tmp/b.amun");
        assert_eq!(a, 0);
        assert_eq!(b, 1);

        assert_eq!(manager.register_source_path("/tmp/a.amun"), a);
        assert!(manager.is_path_registered("/tmp/b.amun"));
        assert!(!manager.is_path_registered("/tmp/c.amun"));
        assert_eq!(manager.resolve_source_path(1), "/tmp/b.amun");
    }
}
