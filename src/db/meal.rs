use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::storage::{Indexed, Record};

/// A selection of records keyed by identity.
#[derive(Debug, Default, Clone)]
pub struct Meal {
    items: BTreeMap<String, Arc<Record>>,
}

impl Meal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `record`, replacing any entry with the same identity.
    /// Returns `true` if the identity was not present before.
    pub fn add(&mut self, record: Arc<Record>) -> bool {
        self.items
            .insert(record.identity().to_owned(), record)
            .is_none()
    }

    pub fn remove(&mut self, id: &str) -> Option<Arc<Record>> {
        self.items.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Items ordered by identity.
    pub fn items(&self) -> impl Iterator<Item = &Arc<Record>> + '_ {
        self.items.values()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sums each of `attributes` over the meal. Items without an attribute
    /// contribute zero to it.
    pub fn summary(&self, attributes: &[String]) -> MealSummary {
        let totals: Vec<(String, f64)> = attributes
            .iter()
            .map(|name| {
                let sum = self
                    .items
                    .values()
                    .map(|record| record.attribute(name).unwrap_or(0.0))
                    .sum::<f64>();
                (name.clone(), sum)
            })
            .collect();
        MealSummary {
            items: self.items.len(),
            totals,
        }
    }
}

/// Per-attribute totals for a meal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealSummary {
    /// Number of distinct items summed.
    pub items: usize,
    /// `(attribute, total)` in the order the attributes were requested.
    pub totals: Vec<(String, f64)>,
}

impl MealSummary {
    /// Total for `attribute`, if it was requested.
    pub fn total(&self, attribute: &str) -> Option<f64> {
        self.totals
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, total)| *total)
    }
}
