//! SHA-256 based change detection for incremental indexing.
//!
//! Tracks content hashes of previously indexed translation units so
//! unchanged units can be skipped on subsequent indexing runs.

use cxindex_storage::RecordStore;
use std::collections::HashMap;

/// Tracks translation-unit content hashes for incremental change detection.
pub struct ChangeDetector {
    /// Map of unit path -> SHA-256 hex hash from the last committed run.
    known_hashes: HashMap<String, String>,
}

impl ChangeDetector {
    /// Create a new empty ChangeDetector.
    pub fn new() -> Self {
        Self {
            known_hashes: HashMap::new(),
        }
    }

    /// Load previously committed hashes from the store.
    ///
    /// If the store cannot be read, starts fresh with no known hashes.
    pub fn load_from_storage(&mut self, store: &RecordStore) {
        match store.load_unit_hashes() {
            Ok(hashes) => {
                self.known_hashes = hashes;
                tracing::debug!("Loaded {} known unit hashes", self.known_hashes.len());
            }
            Err(e) => {
                tracing::warn!("Failed to load unit hashes, starting fresh: {}", e);
            }
        }
    }

    /// Check if a unit has changed since the last index.
    /// Returns `true` if the unit is new or its content hash differs.
    pub fn is_changed(&self, path: &str, content: &[u8]) -> bool {
        let hash = Self::hash_content(content);
        self.known_hashes.get(path) != Some(&hash)
    }

    /// Update the known hash for a unit after its write section committed.
    pub fn update_hash(&mut self, path: &str, hash: String) {
        self.known_hashes.insert(path.to_string(), hash);
    }

    /// Remove the hash for a unit (e.g., when it's dropped from the index).
    pub fn remove_hash(&mut self, path: &str) {
        self.known_hashes.remove(path);
    }

    /// Get the number of tracked units.
    pub fn tracked_count(&self) -> usize {
        self.known_hashes.len()
    }

    /// Compute SHA-256 hash of content bytes.
    pub fn hash_content(content: &[u8]) -> String {
        RecordStore::content_hash(content)
    }
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_unit_is_changed() {
        let detector = ChangeDetector::new();
        assert!(detector.is_changed("main.c", b"int main(void) { return 0; }"));
    }

    #[test]
    fn same_content_not_changed() {
        let mut detector = ChangeDetector::new();
        let content = b"int main(void) { return 0; }";
        detector.update_hash("main.c", ChangeDetector::hash_content(content));
        assert!(!detector.is_changed("main.c", content));
    }

    #[test]
    fn different_content_is_changed() {
        let mut detector = ChangeDetector::new();
        detector.update_hash("main.c", ChangeDetector::hash_content(b"int x;"));
        assert!(detector.is_changed("main.c", b"int x = 1;"));
    }

    #[test]
    fn remove_hash_makes_changed() {
        let mut detector = ChangeDetector::new();
        detector.update_hash("a.c", ChangeDetector::hash_content(b"content"));
        assert!(!detector.is_changed("a.c", b"content"));
        detector.remove_hash("a.c");
        assert!(detector.is_changed("a.c", b"content"));
    }

    #[test]
    fn loads_committed_hashes_from_storage() {
        let store = RecordStore::open_in_memory().unwrap();
        store
            .write(|section| section.save_unit_hash("a.c", &ChangeDetector::hash_content(b"a")))
            .unwrap();

        let mut detector = ChangeDetector::new();
        detector.load_from_storage(&store);
        assert_eq!(detector.tracked_count(), 1);
        assert!(!detector.is_changed("a.c", b"a"));
        assert!(detector.is_changed("b.c", b"b"));
    }
}
