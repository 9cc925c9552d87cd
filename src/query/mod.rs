#![forbid(unsafe_code)]

//! Query parsing and multi-rule evaluation.
//!
//! A query is an optional name substring plus an ordered list of attribute
//! rules. Each rule is answered by one ordered index; results are combined by
//! record identity.

/// Predicate and query representation.
pub mod ast;

/// Fluent builder for queries.
pub mod builder;

/// Query error types.
pub mod errors;

/// Query evaluation against an index registry.
pub mod executor;

pub use ast::{Predicate, Query};
pub use builder::QueryBuilder;
pub use errors::QueryError;
pub use executor::QueryEngine;
