//! cxindex-linkage: the persisted C symbol database.
//!
//! Turns the parser's live semantic bindings into deduplicated, persisted
//! bindings and answers name lookups against them, without re-parsing.
//!
//! # Architecture
//!
//! - **linkage** — The `Linkage` trait, owning-scope resolution, child registration
//! - **c_linkage** — The C dialect: node-type tags, kind dispatch, lookups
//! - **bindings** — One module per persisted kind (variable, function, field, ...)
//! - **binding** — The persisted `Binding` handle and its live-binding view
//! - **anonymous** — Deterministic names for anonymous structs, unions, and enums
//! - **find** — Index comparator and name/prefix lookups
//! - **database** — Opens a store and materializes its linkages
//! - **indexer** — Per-unit write sections, fault isolation, refresh at definitions
//! - **incremental** — SHA-256 based translation-unit change detection

pub mod anonymous;
pub mod binding;
pub mod bindings;
pub mod c_linkage;
pub mod database;
pub mod find;
pub mod incremental;
pub mod indexer;
pub mod linkage;
pub mod node;

pub use binding::Binding;
pub use bindings::basic_type::BasicType;
pub use bindings::parameter::Parameter;
pub use c_linkage::CLinkage;
pub use database::Database;
pub use find::BytewiseComparator;
pub use incremental::ChangeDetector;
pub use indexer::{IndexResult, Indexer};
pub use linkage::{Linkage, Parent};
pub use node::Node;
