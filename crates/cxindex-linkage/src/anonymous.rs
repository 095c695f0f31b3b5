//! Synthetic names for anonymous types.
//!
//! `struct { int x; } s;` declares a composite with no name, but every
//! persisted binding needs one. Anonymous composites and enumerations are
//! named after their definition site, `{anon:<file>:<offset>}`, where `<file>`
//! is the first 16 hex digits of the SHA-256 of the file path. The same
//! definition always yields the same name, so re-indexing adapts to the
//! existing record instead of creating a new one.

use cxindex_core::{BindingKind, SemanticBinding, SourceLocation};
use sha2::{Digest, Sha256};
use std::borrow::Cow;

const PREFIX: &[u8] = b"{anon:";

/// Name `binding` is persisted under. `None` for anonymous entities that
/// cannot be named deterministically.
pub fn persisted_name(binding: &dyn SemanticBinding) -> Option<Cow<'_, [u8]>> {
    let name = binding.name();
    if !name.is_empty() {
        return Some(Cow::Borrowed(name));
    }
    match BindingKind::classify(binding) {
        BindingKind::Composite | BindingKind::Enumeration => binding
            .location()
            .map(|location| Cow::Owned(synthetic_name(&location).into_bytes())),
        _ => None,
    }
}

pub fn synthetic_name(location: &SourceLocation) -> String {
    let digest = Sha256::digest(location.file.as_bytes());
    let file: String = digest[..8].iter().map(|b| format!("{b:02x}")).collect();
    format!("{{anon:{file}:{}}}", location.offset)
}

pub fn is_synthetic(name: &[u8]) -> bool {
    name.starts_with(PREFIX) && name.ends_with(b"}")
}
