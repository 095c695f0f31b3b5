//! The single-writer section.

use crate::{NewRecord, RecordReader};
use cxindex_core::{BindingFlags, CxindexError, RecordId, StoreId};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::cell::Cell;
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, ThreadId};

/// Exclusive write access to a store.
///
/// Everything written through a section becomes visible to readers at
/// [`commit`](WriteSection::commit), all at once. A section that is abandoned,
/// or dropped without committing, is rolled back.
pub struct WriteSection<'s> {
    pub(crate) conn: MutexGuard<'s, Connection>,
    store: &'s StoreId,
    owner: &'s Mutex<Option<ThreadId>>,
    depth: Cell<u32>,
    finished: bool,
}

impl<'s> WriteSection<'s> {
    pub(crate) fn begin(
        conn: MutexGuard<'s, Connection>,
        store: &'s StoreId,
        owner: &'s Mutex<Option<ThreadId>>,
    ) -> Result<Self, CxindexError> {
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        let section = Self {
            conn,
            store,
            owner,
            depth: Cell::new(0),
            finished: false,
        };
        let mut holder = owner
            .lock()
            .map_err(|e| CxindexError::LockPoisoned(e.to_string()))?;
        *holder = Some(thread::current().id());
        drop(holder);
        Ok(section)
    }

    /// Read view that includes this section's uncommitted writes.
    pub fn reader(&self) -> RecordReader<'_> {
        RecordReader::new(&self.conn, self.store)
    }

    /// Run `f` as one atomic step: either all of its writes survive or none do.
    pub fn atomically<T>(
        &self,
        f: impl FnOnce(&Self) -> Result<T, CxindexError>,
    ) -> Result<T, CxindexError> {
        let depth = self.depth.get();
        let savepoint = format!("step_{depth}");
        self.conn
            .execute_batch(&format!("SAVEPOINT {savepoint}"))
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        self.depth.set(depth + 1);
        let result = f(self);
        self.depth.set(depth);

        match result {
            Ok(value) => {
                self.conn
                    .execute_batch(&format!("RELEASE {savepoint}"))
                    .map_err(|e| CxindexError::Storage(e.to_string()))?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self
                    .conn
                    .execute_batch(&format!("ROLLBACK TO {savepoint}; RELEASE {savepoint}"))
                {
                    tracing::warn!("Failed to roll back {}: {}", savepoint, rollback);
                }
                Err(e)
            }
        }
    }

    /// Allocate a new record and return its id.
    pub fn allocate(&self, record: &NewRecord<'_>) -> Result<RecordId, CxindexError> {
        self.conn
            .execute(
                "INSERT INTO records (node_type, parent, name, flags, payload) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.node_type.0,
                    record.parent.get(),
                    record.name,
                    record.flags.0,
                    record.payload,
                ],
            )
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        Ok(RecordId(self.conn.last_insert_rowid()))
    }

    /// Replace the kind-specific trailing fields of a record.
    pub fn write_payload<T: Serialize>(
        &self,
        id: RecordId,
        payload: &T,
    ) -> Result<(), CxindexError> {
        let payload = serde_json::to_string(payload)?;
        let updated = self
            .conn
            .execute(
                "UPDATE records SET payload = ?1 WHERE id = ?2",
                params![payload, id.get()],
            )
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        if updated == 0 {
            return Err(CxindexError::RecordNotFound(id));
        }
        Ok(())
    }

    pub fn set_flags(&self, id: RecordId, flags: BindingFlags) -> Result<(), CxindexError> {
        let updated = self
            .conn
            .execute(
                "UPDATE records SET flags = ?1 WHERE id = ?2",
                params![flags.0, id.get()],
            )
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        if updated == 0 {
            return Err(CxindexError::RecordNotFound(id));
        }
        Ok(())
    }

    /// Append `child` to the ordered child list of `owner`.
    pub fn add_child(&self, owner: RecordId, child: RecordId) -> Result<(), CxindexError> {
        self.conn
            .execute(
                "INSERT INTO children (owner, ordinal, child)
                 SELECT ?1, COALESCE(MAX(ordinal) + 1, 0), ?2 FROM children WHERE owner = ?1",
                params![owner.get(), child.get()],
            )
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Free a record together with its child-list and index links.
    pub fn free(&self, id: RecordId) -> Result<bool, CxindexError> {
        self.conn
            .execute(
                "DELETE FROM children WHERE owner = ?1 OR child = ?1",
                params![id.get()],
            )
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        self.index_remove(id)?;
        let deleted = self
            .conn
            .execute("DELETE FROM records WHERE id = ?1", params![id.get()])
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        Ok(deleted > 0)
    }

    /// Register a linkage's record and index root under its id.
    pub fn register_linkage(
        &self,
        id: &str,
        record: RecordId,
        index_root: RecordId,
    ) -> Result<(), CxindexError> {
        self.conn
            .execute(
                "INSERT INTO linkages (id, record, index_root) VALUES (?1, ?2, ?3)",
                params![id, record.get(), index_root.get()],
            )
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Record the content hash a translation unit was indexed at.
    pub fn save_unit_hash(&self, path: &str, hash: &str) -> Result<(), CxindexError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO unit_hashes (path, content_hash, indexed_at) VALUES (?1, ?2, ?3)",
                params![path, hash, chrono::Utc::now().timestamp()],
            )
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        Ok(())
    }

    pub fn remove_unit_hash(&self, path: &str) -> Result<bool, CxindexError> {
        let deleted = self
            .conn
            .execute("DELETE FROM unit_hashes WHERE path = ?1", params![path])
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        Ok(deleted > 0)
    }

    /// Publish every write of this section to readers.
    pub fn commit(mut self) -> Result<(), CxindexError> {
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        self.finished = true;
        Ok(())
    }

    /// Discard every write of this section.
    pub fn abandon(mut self) -> Result<(), CxindexError> {
        self.finished = true;
        self.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| CxindexError::Storage(e.to_string()))
    }
}

impl Drop for WriteSection<'_> {
    fn drop(&mut self) {
        if let Ok(mut owner) = self.owner.lock() {
            *owner = None;
        }
        if self.finished {
            return;
        }
        if let Err(e) = self.conn.execute_batch("ROLLBACK") {
            tracing::warn!("Failed to roll back abandoned write section: {}", e);
        }
    }
}
