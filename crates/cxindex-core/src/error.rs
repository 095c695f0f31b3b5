use crate::{NodeType, RecordId};

/// Unified error type for cxindex.
///
/// Expected misses (unknown names, unresolved parents, problem bindings) are
/// never errors; they surface as `Ok(None)` or empty result sets. Everything
/// here aborts indexing of the current translation unit.
#[derive(Debug, thiserror::Error)]
pub enum CxindexError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Corrupt node type {node_type} at record {record}")]
    CorruptNodeType { record: RecordId, node_type: NodeType },

    #[error("Unknown linkage: {0}")]
    UnknownLinkage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CxindexError {
    /// True for faults raised by the record store itself (I/O or corrupt data).
    pub fn is_storage_fault(&self) -> bool {
        matches!(
            self,
            Self::Storage(_)
                | Self::RecordNotFound(_)
                | Self::CorruptNodeType { .. }
                | Self::Io(_)
                | Self::Json(_)
        )
    }
}
