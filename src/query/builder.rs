//! Fluent query builder.

use crate::query::ast::{Predicate, Query};
use crate::query::errors::QueryError;

/// Builds a [`Query`] from a name filter and rule strings.
///
/// The first rule that fails to parse is remembered and returned by
/// [`QueryBuilder::build`]; later calls are ignored.
#[derive(Default)]
pub struct QueryBuilder {
    query: Query,
    error: Option<QueryError>,
}

impl QueryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to records whose name contains `needle`.
    pub fn name_contains(mut self, needle: impl Into<String>) -> Self {
        if self.error.is_none() {
            self.query.name_filter = Some(needle.into());
        }
        self
    }

    /// Adds a rule in `"<attribute> <operator> <bound>"` form.
    pub fn rule(mut self, rule: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        match rule.parse::<Predicate>() {
            Ok(pred) => self.query.predicates.push(pred),
            Err(err) => self.error = Some(err),
        }
        self
    }

    /// Adds an already-built predicate.
    pub fn predicate(mut self, pred: Predicate) -> Self {
        if self.error.is_none() {
            self.query.predicates.push(pred);
        }
        self
    }

    /// Finishes the query or returns the first parse error.
    pub fn build(self) -> Result<Query, QueryError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.query),
        }
    }
}
