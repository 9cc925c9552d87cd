//! In-memory B+ tree indexes and a multi-attribute query engine for
//! attribute-tagged records.
//!
//! Records are loaded from delimited text into a [`Dataset`], which keeps one
//! [`OrderedIndex`] per configured attribute. Queries combine a name substring
//! with range rules such as `"protein >= 12"` and intersect the matches by
//! record identity.

#![warn(missing_docs)]

pub mod cli;
pub mod db;
pub mod query;
pub mod storage;
pub mod types;

pub use db::{Dataset, DatasetOptions, LoadSummary, Meal, MealSummary};
pub use query::{Predicate, Query, QueryBuilder, QueryEngine, QueryError};
pub use storage::{AttrValue, Attribute, IndexRegistry, Indexed, OrderedIndex, RangeOp, Record};
pub use types::{LarderError, Result};
