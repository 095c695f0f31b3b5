//! cxindex-storage: SQLite-backed record store for the cxindex symbol database.
//!
//! Uses rusqlite with bundled SQLite, WAL mode, and versioned migrations.
//! Records are addressed by integer id; parent, child, and index relations are
//! plain id columns. All mutation goes through a [`WriteSection`]; lookups go
//! through a [`RecordReader`].

use cxindex_core::{CxindexError, StorageConfig, StoreId};
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use std::time::Duration;

mod migrations;
mod name_index;
mod records;
mod section;

pub use name_index::IndexEntry;
pub use records::{NewRecord, RecordHeader, RecordReader};
pub use section::WriteSection;

/// Single-writer, many-reader record store.
///
/// The writer connection sits behind a `Mutex`, so holding a [`WriteSection`]
/// excludes every other writer. File-backed stores also open read-only
/// connections; with WAL they only ever observe committed transactions.
/// In-memory stores serve reads from the writer connection.
pub struct RecordStore {
    id: StoreId,
    writer: Mutex<Connection>,
    /// Thread holding the open write section, if any.
    section_owner: Mutex<Option<ThreadId>>,
    readers: Vec<Mutex<Connection>>,
    next_reader: AtomicUsize,
}

impl RecordStore {
    /// Open (or create) a store at the given path.
    pub fn open(path: &Path, config: &StorageConfig) -> Result<Self, CxindexError> {
        let conn = Connection::open(path).map_err(|e| CxindexError::Storage(e.to_string()))?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        conn.pragma_update(None, "cache_size", -(i64::from(config.cache_size_mb) * 1000))
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        conn.pragma_update(None, "temp_store", "MEMORY")
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        conn.busy_timeout(Duration::from_secs(config.busy_timeout_secs))
            .map_err(|e| CxindexError::Storage(e.to_string()))?;

        migrations::run_migrations(&conn)?;
        let id = load_or_create_store_id(&conn)?;

        let mut readers = Vec::with_capacity(config.reader_connections);
        for _ in 0..config.reader_connections {
            let reader = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
            reader
                .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
                .map_err(|e| CxindexError::Storage(e.to_string()))?;
            readers.push(Mutex::new(reader));
        }

        tracing::info!(
            "Opened record store {} at {} ({} reader connections)",
            id,
            path.display(),
            readers.len()
        );

        Ok(Self {
            id,
            writer: Mutex::new(conn),
            section_owner: Mutex::new(None),
            readers,
            next_reader: AtomicUsize::new(0),
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, CxindexError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CxindexError::Storage(e.to_string()))?;
        migrations::run_migrations(&conn)?;
        let id = load_or_create_store_id(&conn)?;
        Ok(Self {
            id,
            writer: Mutex::new(conn),
            section_owner: Mutex::new(None),
            readers: Vec::new(),
            next_reader: AtomicUsize::new(0),
        })
    }

    /// Identity of this store, persisted across reopen.
    pub fn id(&self) -> &StoreId {
        &self.id
    }

    /// Run `f` against a consistent, committed snapshot of the store.
    ///
    /// In-memory stores read through the writer connection. Calling `read`
    /// there from the thread that holds the open [`WriteSection`] fails with
    /// [`CxindexError::Storage`] instead of waiting on its own lock; use
    /// [`WriteSection::reader`] for reads inside a section.
    pub fn read<T>(
        &self,
        f: impl FnOnce(&RecordReader<'_>) -> Result<T, CxindexError>,
    ) -> Result<T, CxindexError> {
        let conn = self.reader_connection()?;
        conn.execute_batch("BEGIN DEFERRED")
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        let result = f(&RecordReader::new(&conn, &self.id));
        if let Err(e) = conn.execute_batch("COMMIT") {
            tracing::warn!("Failed to close read snapshot: {}", e);
            if let Err(rollback) = conn.execute_batch("ROLLBACK") {
                tracing::warn!("Failed to roll back read snapshot: {}", rollback);
            }
        }
        result
    }

    /// Open the write section. Blocks until no other writer holds it.
    pub fn begin_write(&self) -> Result<WriteSection<'_>, CxindexError> {
        let conn = lock(&self.writer)?;
        WriteSection::begin(conn, &self.id, &self.section_owner)
    }

    /// Run `f` in a write section, committing on success and abandoning on error.
    pub fn write<T>(
        &self,
        f: impl FnOnce(&WriteSection<'_>) -> Result<T, CxindexError>,
    ) -> Result<T, CxindexError> {
        let section = self.begin_write()?;
        match f(&section) {
            Ok(value) => {
                section.commit()?;
                Ok(value)
            }
            Err(e) => {
                section.abandon()?;
                Err(e)
            }
        }
    }

    /// Load all translation-unit hashes. Returns path -> hash map.
    pub fn load_unit_hashes(&self) -> Result<HashMap<String, String>, CxindexError> {
        self.read(|reader| reader.unit_hashes())
    }

    /// Compute SHA-256 hash of content for change detection.
    pub fn content_hash(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        format!("{:x}", hasher.finalize())
    }

    fn holds_section(&self) -> Result<bool, CxindexError> {
        let owner = self
            .section_owner
            .lock()
            .map_err(|e| CxindexError::LockPoisoned(e.to_string()))?;
        Ok(*owner == Some(thread::current().id()))
    }

    fn reader_connection(&self) -> Result<MutexGuard<'_, Connection>, CxindexError> {
        if self.readers.is_empty() {
            if self.holds_section()? {
                return Err(CxindexError::Storage(
                    "read on an in-memory store while this thread holds its write section"
                        .to_string(),
                ));
            }
            return lock(&self.writer);
        }
        let start = self.next_reader.fetch_add(1, Ordering::Relaxed);
        for i in 0..self.readers.len() {
            let slot = &self.readers[(start + i) % self.readers.len()];
            if let Ok(guard) = slot.try_lock() {
                return Ok(guard);
            }
        }
        lock(&self.readers[start % self.readers.len()])
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, CxindexError> {
    conn.lock()
        .map_err(|e| CxindexError::LockPoisoned(e.to_string()))
}

fn load_or_create_store_id(conn: &Connection) -> Result<StoreId, CxindexError> {
    let existing: Option<String> = conn
        .query_row(
            "SELECT value FROM store_meta WHERE key = 'store_id'",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| CxindexError::Storage(e.to_string()))?;

    if let Some(value) = existing {
        return value.parse();
    }

    let id = StoreId::generate();
    conn.execute(
        "INSERT INTO store_meta (key, value) VALUES ('store_id', ?1)",
        [id.to_string()],
    )
    .map_err(|e| CxindexError::Storage(e.to_string()))?;
    Ok(id)
}
