//! Entry point: a record store plus the linkages materialized over it.

use crate::{CLinkage, Linkage};
use cxindex_core::{CxindexConfig, CxindexError, StorageConfig, C_LINKAGE_ID};
use cxindex_storage::RecordStore;
use std::path::Path;

pub struct Database {
    store: RecordStore,
    c: CLinkage,
}

impl Database {
    /// Open the database configured in `config.storage`.
    pub fn open(config: &CxindexConfig) -> Result<Self, CxindexError> {
        let path = Path::new(&config.storage.db_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open_at(path, &config.storage)
    }

    pub fn open_at(path: &Path, config: &StorageConfig) -> Result<Self, CxindexError> {
        Self::with_store(RecordStore::open(path, config)?)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, CxindexError> {
        Self::with_store(RecordStore::open_in_memory()?)
    }

    fn with_store(store: RecordStore) -> Result<Self, CxindexError> {
        let c = CLinkage::open(&store)?;
        Ok(Self { store, c })
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn c_linkage(&self) -> &CLinkage {
        &self.c
    }

    /// Linkage registered under `id`.
    pub fn linkage(&self, id: &str) -> Result<&dyn Linkage, CxindexError> {
        match id {
            C_LINKAGE_ID => Ok(&self.c),
            other => Err(CxindexError::UnknownLinkage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxindex_core::CPP_LINKAGE_ID;

    #[test]
    fn c_linkage_is_available_by_id() {
        let db = Database::open_in_memory().unwrap();
        let linkage = db.linkage(C_LINKAGE_ID).unwrap();
        assert_eq!(linkage.id(), "C");
        assert_eq!(linkage.record(), db.c_linkage().record());
    }

    #[test]
    fn unsupported_linkage_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.linkage(CPP_LINKAGE_ID),
            Err(CxindexError::UnknownLinkage(id)) if id == "C++"
        ));
    }

    #[test]
    fn open_from_config_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CxindexConfig::default();
        config.storage.db_path = dir
            .path()
            .join("nested")
            .join("index.db")
            .to_string_lossy()
            .into_owned();
        config.storage.reader_connections = 1;

        let first = Database::open(&config).unwrap();
        let record = first.c_linkage().record();
        let store_id = first.store().id().clone();
        drop(first);

        let reopened = Database::open(&config).unwrap();
        assert_eq!(reopened.c_linkage().record(), record);
        assert_eq!(reopened.store().id(), &store_id);
    }
}
