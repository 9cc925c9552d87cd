#![forbid(unsafe_code)]

//! In-memory B+ tree with a doubly linked leaf chain.

mod node;
mod search;
mod stats;
mod tree;

pub use search::RangeOp;
pub use stats::{IndexStats, IndexStatsSnapshot};
pub use tree::{Iter, OrderedIndex};
