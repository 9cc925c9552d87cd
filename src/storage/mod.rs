//! In-memory index structures.
//!
//! A generic B+ tree with a linked leaf layer, the record model it indexes,
//! and a registry holding one tree per numeric attribute.

/// B+ tree with a doubly linked leaf chain.
pub mod btree;

/// Per-attribute index registry.
pub mod index;

mod record;

pub use btree::{IndexStats, IndexStatsSnapshot, OrderedIndex, RangeOp};
pub use index::IndexRegistry;
pub use record::{AttrValue, Attribute, Indexed, Record};
