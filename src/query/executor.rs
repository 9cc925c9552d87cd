//! Evaluates queries against an [`IndexRegistry`] and its record list.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::query::ast::{Predicate, Query};
use crate::query::errors::QueryError;
use crate::storage::{IndexRegistry, Indexed};

/// Read-only view pairing the registry with the records it was built from.
///
/// `records` is the caller's list in its own order (the dataset keeps it
/// sorted by name); name filtering and the final intersection follow that
/// order.
pub struct QueryEngine<'a, R> {
    registry: &'a IndexRegistry<R>,
    records: &'a [Arc<R>],
}

impl<'a, R: Indexed> QueryEngine<'a, R> {
    /// Creates an engine over `records` and the registry built from them.
    pub fn new(registry: &'a IndexRegistry<R>, records: &'a [Arc<R>]) -> Self {
        Self { registry, records }
    }

    /// Records whose name contains `needle` (case-sensitive), in list order.
    pub fn filter_by_name(&self, needle: &str) -> Vec<Arc<R>> {
        self.records
            .iter()
            .filter(|record| record.name().contains(needle))
            .cloned()
            .collect()
    }

    /// Intersects the range searches of `predicates` by record identity.
    ///
    /// The first predicate seeds the candidate list; every later predicate
    /// keeps the candidates whose identity appears in its own matches. The
    /// candidates' order, including repeated identities, is preserved. With
    /// no predicates every record is returned.
    pub fn filter_by_predicates(&self, predicates: &[Predicate]) -> Result<Vec<Arc<R>>, QueryError> {
        self.validate(predicates)?;
        let Some((first, rest)) = predicates.split_first() else {
            return Ok(self.records.to_vec());
        };
        let mut candidates: Vec<Arc<R>> = self.evaluate(first)?.into_iter().cloned().collect();
        for pred in rest {
            let matches = self.evaluate(pred)?;
            candidates.retain(|candidate| {
                matches
                    .iter()
                    .any(|found| found.identity() == candidate.identity())
            });
        }
        Ok(candidates)
    }

    /// Runs the name filter and the rules, then keeps the name matches whose
    /// identity survived every rule.
    ///
    /// The result follows the name filter's order. Every rule attribute is
    /// checked against the registry before any search runs.
    pub fn execute(&self, query: &Query) -> Result<Vec<Arc<R>>, QueryError> {
        self.validate(&query.predicates)?;
        let named = match query.name_filter.as_deref() {
            Some(needle) => self.filter_by_name(needle),
            None => self.records.to_vec(),
        };
        if query.predicates.is_empty() {
            debug!(matched = named.len(), "query.completed");
            return Ok(named);
        }
        let indexed = self.filter_by_predicates(&query.predicates)?;
        let survivors: HashSet<&str> = indexed.iter().map(|record| record.identity()).collect();
        let result: Vec<Arc<R>> = named
            .into_iter()
            .filter(|record| survivors.contains(record.identity()))
            .collect();
        debug!(
            predicates = query.predicates.len(),
            matched = result.len(),
            "query.completed"
        );
        Ok(result)
    }

    fn validate(&self, predicates: &[Predicate]) -> Result<(), QueryError> {
        match predicates
            .iter()
            .find(|pred| !self.registry.contains(&pred.attribute))
        {
            Some(pred) => Err(QueryError::UnknownAttribute {
                attribute: pred.attribute.clone(),
            }),
            None => Ok(()),
        }
    }

    fn evaluate(&self, pred: &Predicate) -> Result<Vec<&'a Arc<R>>, QueryError> {
        let registry: &'a IndexRegistry<R> = self.registry;
        let found = registry
            .search(&pred.attribute, &pred.operator, pred.bound)
            .map_err(|_| QueryError::UnknownAttribute {
                attribute: pred.attribute.clone(),
            })?;
        debug!(
            attribute = %pred.attribute,
            operator = %pred.operator,
            bound = pred.bound,
            matched = found.len(),
            "query.predicate.evaluated"
        );
        Ok(found)
    }
}
