//! Record headers, payloads, and ordered child lists.

use cxindex_core::{BindingFlags, CxindexError, NodeType, RecordId, StoreId};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

/// Fixed header every record carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub id: RecordId,
    pub node_type: NodeType,
    pub parent: RecordId,
    pub name: Vec<u8>,
    pub flags: BindingFlags,
}

/// A record about to be allocated.
#[derive(Debug, Clone)]
pub struct NewRecord<'a> {
    pub node_type: NodeType,
    pub parent: RecordId,
    pub name: &'a [u8],
    pub flags: BindingFlags,
    pub payload: String,
}

impl<'a> NewRecord<'a> {
    pub fn new(node_type: NodeType, parent: RecordId, name: &'a [u8]) -> Self {
        Self {
            node_type,
            parent,
            name,
            flags: BindingFlags::EMPTY,
            payload: "{}".to_string(),
        }
    }

    pub fn with_flags(mut self, flags: BindingFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Attach the kind-specific trailing fields.
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Result<Self, CxindexError> {
        self.payload = serde_json::to_string(payload)?;
        Ok(self)
    }
}

/// Read access to a store, bound to one connection and one snapshot.
pub struct RecordReader<'c> {
    pub(crate) conn: &'c Connection,
    store: &'c StoreId,
}

impl<'c> RecordReader<'c> {
    pub(crate) fn new(conn: &'c Connection, store: &'c StoreId) -> Self {
        Self { conn, store }
    }

    /// Identity of the store this reader belongs to.
    pub fn store_id(&self) -> &StoreId {
        self.store
    }

    /// Read a record header. Returns `None` if no such record exists.
    pub fn header(&self, id: RecordId) -> Result<Option<RecordHeader>, CxindexError> {
        self.conn
            .query_row(
                "SELECT id, node_type, parent, name, flags FROM records WHERE id = ?1",
                params![id.get()],
                |row| {
                    Ok(RecordHeader {
                        id: RecordId(row.get(0)?),
                        node_type: NodeType(row.get(1)?),
                        parent: RecordId(row.get(2)?),
                        name: row.get(3)?,
                        flags: BindingFlags(row.get(4)?),
                    })
                },
            )
            .optional()
            .map_err(|e| CxindexError::Storage(e.to_string()))
    }

    /// Read a record header that must exist.
    pub fn require_header(&self, id: RecordId) -> Result<RecordHeader, CxindexError> {
        self.header(id)?.ok_or(CxindexError::RecordNotFound(id))
    }

    /// Stored node-type tag of a record that must exist.
    pub fn node_type(&self, id: RecordId) -> Result<NodeType, CxindexError> {
        let node_type: Option<u16> = self
            .conn
            .query_row(
                "SELECT node_type FROM records WHERE id = ?1",
                params![id.get()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        node_type
            .map(NodeType)
            .ok_or(CxindexError::RecordNotFound(id))
    }

    /// Decode the kind-specific trailing fields of a record.
    pub fn payload<T: DeserializeOwned>(&self, id: RecordId) -> Result<T, CxindexError> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM records WHERE id = ?1",
                params![id.get()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        let payload = payload.ok_or(CxindexError::RecordNotFound(id))?;
        Ok(serde_json::from_str(&payload)?)
    }

    /// Children of `owner` in insertion order.
    pub fn children(&self, owner: RecordId) -> Result<Vec<RecordId>, CxindexError> {
        let mut stmt = self
            .conn
            .prepare("SELECT child FROM children WHERE owner = ?1 ORDER BY ordinal")
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        let ids = stmt
            .query_map(params![owner.get()], |row| row.get(0).map(RecordId))
            .map_err(|e| CxindexError::Storage(e.to_string()))?
            .collect::<Result<Vec<RecordId>, _>>()
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        Ok(ids)
    }

    /// Children of `owner` with the given name whose tag is in `node_types`,
    /// in insertion order.
    pub fn find_children(
        &self,
        owner: RecordId,
        name: &[u8],
        node_types: &[NodeType],
    ) -> Result<Vec<RecordId>, CxindexError> {
        if node_types.is_empty() {
            return Ok(Vec::new());
        }
        let mut stmt = self
            .conn
            .prepare(
                "SELECT r.id, r.node_type FROM children c JOIN records r ON r.id = c.child
                 WHERE c.owner = ?1 AND r.name = ?2 ORDER BY c.ordinal",
            )
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        let rows = stmt
            .query_map(params![owner.get(), name], |row| {
                Ok((RecordId(row.get(0)?), NodeType(row.get(1)?)))
            })
            .map_err(|e| CxindexError::Storage(e.to_string()))?;

        let mut found = Vec::new();
        for row in rows {
            let (id, node_type) = row.map_err(|e| CxindexError::Storage(e.to_string()))?;
            if node_types.contains(&node_type) {
                found.push(id);
            }
        }
        Ok(found)
    }

    /// Total number of records.
    pub fn record_count(&self) -> Result<usize, CxindexError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        Ok(count as usize)
    }

    /// Linkage record and index root registered under `id`.
    pub fn linkage_roots(&self, id: &str) -> Result<Option<(RecordId, RecordId)>, CxindexError> {
        self.conn
            .query_row(
                "SELECT record, index_root FROM linkages WHERE id = ?1",
                params![id],
                |row| Ok((RecordId(row.get(0)?), RecordId(row.get(1)?))),
            )
            .optional()
            .map_err(|e| CxindexError::Storage(e.to_string()))
    }

    /// All translation-unit hashes. Returns path -> hash map.
    pub fn unit_hashes(&self) -> Result<HashMap<String, String>, CxindexError> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, content_hash FROM unit_hashes")
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        let mut hashes = HashMap::new();
        for row in rows {
            let (path, hash) = row.map_err(|e| CxindexError::Storage(e.to_string()))?;
            hashes.insert(path, hash);
        }
        Ok(hashes)
    }
}

#[cfg(test)]
mod tests {
    use crate::{NewRecord, RecordStore};
    use cxindex_core::{BindingFlags, CxindexError, NodeType, RecordId};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        value: i64,
    }

    #[test]
    fn allocate_and_read_header_and_payload() {
        let store = RecordStore::open_in_memory().unwrap();
        let id = store
            .write(|section| {
                section.allocate(
                    &NewRecord::new(NodeType(20), RecordId(3), b"counter")
                        .with_flags(BindingFlags::INTERNAL_LINKAGE)
                        .with_payload(&Payload { value: 7 })?,
                )
            })
            .unwrap();

        store
            .read(|reader| {
                let header = reader.require_header(id)?;
                assert_eq!(header.node_type, NodeType(20));
                assert_eq!(header.parent, RecordId(3));
                assert_eq!(header.name, b"counter".to_vec());
                assert!(header.flags.contains(BindingFlags::INTERNAL_LINKAGE));
                let payload: Payload = reader.payload(id)?;
                assert_eq!(payload, Payload { value: 7 });
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn missing_record_is_a_fault_only_when_required() {
        let store = RecordStore::open_in_memory().unwrap();
        store
            .read(|reader| {
                assert!(reader.header(RecordId(99))?.is_none());
                assert!(matches!(
                    reader.require_header(RecordId(99)),
                    Err(CxindexError::RecordNotFound(RecordId(99)))
                ));
                assert!(reader.node_type(RecordId(99)).is_err());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn children_keep_insertion_order() {
        let store = RecordStore::open_in_memory().unwrap();
        let (owner, kids) = store
            .write(|section| {
                let owner = section.allocate(&NewRecord::new(NodeType(20), RecordId::NONE, b"S"))?;
                let mut kids = Vec::new();
                for name in [b"z".as_slice(), b"a", b"m"] {
                    let kid = section.allocate(&NewRecord::new(NodeType(21), owner, name))?;
                    section.add_child(owner, kid)?;
                    kids.push(kid);
                }
                Ok((owner, kids))
            })
            .unwrap();

        let children = store.read(|reader| reader.children(owner)).unwrap();
        assert_eq!(children, kids);
    }

    #[test]
    fn find_children_filters_by_name_and_tag() {
        let store = RecordStore::open_in_memory().unwrap();
        let (owner, field) = store
            .write(|section| {
                let owner = section.allocate(&NewRecord::new(NodeType(20), RecordId::NONE, b"S"))?;
                let field = section.allocate(&NewRecord::new(NodeType(21), owner, b"x"))?;
                let nested = section.allocate(&NewRecord::new(NodeType(22), owner, b"x"))?;
                section.add_child(owner, field)?;
                section.add_child(owner, nested)?;
                Ok((owner, field))
            })
            .unwrap();

        store
            .read(|reader| {
                assert_eq!(reader.find_children(owner, b"x", &[NodeType(21)])?, vec![field]);
                assert_eq!(
                    reader
                        .find_children(owner, b"x", &[NodeType(21), NodeType(22)])?
                        .len(),
                    2
                );
                assert!(reader.find_children(owner, b"y", &[NodeType(21)])?.is_empty());
                assert!(reader.find_children(owner, b"x", &[])?.is_empty());
                Ok(())
            })
            .unwrap();
    }
}
