//! Lookups over a linkage's name index and over owner child lists.

use crate::{Binding, Linkage};
use cxindex_core::{CxindexError, IndexComparator, NodeType, RecordId};
use cxindex_storage::RecordReader;
use std::cmp::Ordering;

/// Plain lexicographic byte order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytewiseComparator;

impl IndexComparator for BytewiseComparator {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}

/// File-scope bindings named exactly `name` with one of `node_types`.
pub(crate) fn find_in_index<L: Linkage + ?Sized>(
    reader: &RecordReader<'_>,
    linkage: &L,
    name: &[u8],
    node_types: &[NodeType],
) -> Result<Vec<Binding>, CxindexError> {
    reader
        .index_find(
            linkage.index_root(),
            name,
            node_types,
            linkage.index_comparator(),
        )?
        .into_iter()
        .map(|entry| Binding::load(reader, linkage, entry.record))
        .collect()
}

/// Members of `owner` named exactly `name` with one of `node_types`, in
/// declaration order.
pub(crate) fn find_in_owner<L: Linkage + ?Sized>(
    reader: &RecordReader<'_>,
    linkage: &L,
    owner: RecordId,
    name: &[u8],
    node_types: &[NodeType],
) -> Result<Vec<Binding>, CxindexError> {
    reader
        .find_children(owner, name, node_types)?
        .into_iter()
        .map(|record| Binding::load(reader, linkage, record))
        .collect()
}

pub(crate) fn find_with_prefix<L: Linkage + ?Sized>(
    reader: &RecordReader<'_>,
    linkage: &L,
    prefix: &[u8],
    node_types: &[NodeType],
) -> Result<Vec<Binding>, CxindexError> {
    reader
        .index_find_prefix(
            linkage.index_root(),
            prefix,
            node_types,
            linkage.index_comparator(),
        )?
        .into_iter()
        .map(|entry| Binding::load(reader, linkage, entry.record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytewise_order_is_total_and_lexicographic() {
        let cmp = BytewiseComparator;
        assert_eq!(cmp.compare(b"abc", b"abd"), Ordering::Less);
        assert_eq!(cmp.compare(b"ab", b"abc"), Ordering::Less);
        assert_eq!(cmp.compare(b"B", b"a"), Ordering::Less);
        assert_eq!(cmp.compare(b"same", b"same"), Ordering::Equal);
        assert_eq!(cmp.compare(&[0xC3, 0xA9], b"z"), Ordering::Greater);
    }
}
