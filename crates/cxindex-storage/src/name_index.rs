//! Ordered name index.
//!
//! Keys are raw name bytes stored as BLOBs, which SQLite orders with memcmp.
//! Lookups narrow on the key with SQL and then order the hits with the
//! caller's comparator, breaking ties on node type and record id.

use crate::{RecordReader, WriteSection};
use cxindex_core::{CxindexError, IndexComparator, NodeType, RecordId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};

/// One entry of a name index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: Vec<u8>,
    pub node_type: NodeType,
    pub record: RecordId,
}

impl RecordReader<'_> {
    /// Entries under `root` named exactly `name` whose tag is in `node_types`.
    pub fn index_find(
        &self,
        root: RecordId,
        name: &[u8],
        node_types: &[NodeType],
        comparator: &dyn IndexComparator,
    ) -> Result<Vec<IndexEntry>, CxindexError> {
        if node_types.is_empty() {
            return Ok(Vec::new());
        }
        let mut values = vec![Value::Integer(root.get()), Value::Blob(name.to_vec())];
        let sql = format!(
            "SELECT name, node_type, record FROM name_index WHERE root = ?1 AND name = ?2 AND node_type IN ({})",
            placeholders(&mut values, node_types)
        );
        let mut entries = self.query_entries(&sql, values)?;
        sort_entries(&mut entries, comparator);
        Ok(entries)
    }

    /// Entries under `root` whose name starts with `prefix`.
    pub fn index_find_prefix(
        &self,
        root: RecordId,
        prefix: &[u8],
        node_types: &[NodeType],
        comparator: &dyn IndexComparator,
    ) -> Result<Vec<IndexEntry>, CxindexError> {
        if node_types.is_empty() {
            return Ok(Vec::new());
        }
        let mut values = vec![Value::Integer(root.get()), Value::Blob(prefix.to_vec())];
        let upper = match prefix_upper_bound(prefix) {
            Some(upper) => {
                values.push(Value::Blob(upper));
                " AND name < ?3"
            }
            None => "",
        };
        let sql = format!(
            "SELECT name, node_type, record FROM name_index WHERE root = ?1 AND name >= ?2{upper} AND node_type IN ({})",
            placeholders(&mut values, node_types)
        );
        let mut entries = self.query_entries(&sql, values)?;
        entries.retain(|entry| entry.name.starts_with(prefix));
        sort_entries(&mut entries, comparator);
        Ok(entries)
    }

    /// Every entry under `root`.
    pub fn index_entries(
        &self,
        root: RecordId,
        comparator: &dyn IndexComparator,
    ) -> Result<Vec<IndexEntry>, CxindexError> {
        let mut entries = self.query_entries(
            "SELECT name, node_type, record FROM name_index WHERE root = ?1",
            vec![Value::Integer(root.get())],
        )?;
        sort_entries(&mut entries, comparator);
        Ok(entries)
    }

    fn query_entries(
        &self,
        sql: &str,
        values: Vec<Value>,
    ) -> Result<Vec<IndexEntry>, CxindexError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        let rows = stmt
            .query_map(params_from_iter(values), |row| {
                Ok(IndexEntry {
                    name: row.get(0)?,
                    node_type: NodeType(row.get(1)?),
                    record: RecordId(row.get(2)?),
                })
            })
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| CxindexError::Storage(e.to_string()))
    }
}

impl WriteSection<'_> {
    /// Insert `record` under `root` keyed by `name`.
    pub fn index_insert(
        &self,
        root: RecordId,
        name: &[u8],
        node_type: NodeType,
        record: RecordId,
    ) -> Result<(), CxindexError> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO name_index (root, name, node_type, record) VALUES (?1, ?2, ?3, ?4)",
                params![root.get(), name, node_type.0, record.get()],
            )
            .map_err(|e| CxindexError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Remove every index entry pointing at `record`.
    pub fn index_remove(&self, record: RecordId) -> Result<usize, CxindexError> {
        self.conn
            .execute(
                "DELETE FROM name_index WHERE record = ?1",
                params![record.get()],
            )
            .map_err(|e| CxindexError::Storage(e.to_string()))
    }
}

/// Appends node types to `values` and returns their placeholder list.
fn placeholders(values: &mut Vec<Value>, node_types: &[NodeType]) -> String {
    let mut list = Vec::with_capacity(node_types.len());
    for node_type in node_types {
        values.push(Value::Integer(i64::from(node_type.0)));
        list.push(format!("?{}", values.len()));
    }
    list.join(",")
}

/// Smallest key greater than every key starting with `prefix`, if one exists.
fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    while let Some(last) = upper.pop() {
        if last < u8::MAX {
            upper.push(last + 1);
            return Some(upper);
        }
    }
    None
}

fn sort_entries(entries: &mut [IndexEntry], comparator: &dyn IndexComparator) {
    entries.sort_by(|a, b| {
        comparator
            .compare(&a.name, &b.name)
            .then(a.node_type.cmp(&b.node_type))
            .then(a.record.cmp(&b.record))
    });
}
