use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::storage::btree::OrderedIndex;
use crate::storage::record::{AttrValue, Indexed};
use crate::types::{LarderError, Result};

type AttrIndex<R> = OrderedIndex<AttrValue, Arc<R>>;

/// One ordered index per registered attribute name.
///
/// The attribute set is closed: it is fixed when the registry is created and
/// every record handed to [`IndexRegistry::rebuild`] or
/// [`IndexRegistry::add_one`] may only carry those attributes.
pub struct IndexRegistry<R> {
    branching_factor: usize,
    attributes: Vec<String>,
    indexes: BTreeMap<String, AttrIndex<R>>,
}

impl<R: Indexed> IndexRegistry<R> {
    /// Creates a registry with an empty tree per attribute.
    pub fn new<I, S>(attributes: I, branching_factor: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if branching_factor <= 2 {
            return Err(LarderError::InvalidBranchingFactor(branching_factor));
        }
        let mut names = Vec::new();
        for name in attributes {
            let name = name.into();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        let indexes = Self::empty_indexes(&names, branching_factor)?;
        Ok(Self {
            branching_factor,
            attributes: names,
            indexes,
        })
    }

    fn empty_indexes(
        names: &[String],
        branching_factor: usize,
    ) -> Result<BTreeMap<String, AttrIndex<R>>> {
        let mut indexes = BTreeMap::new();
        for name in names {
            indexes.insert(name.clone(), OrderedIndex::new(branching_factor)?);
        }
        Ok(indexes)
    }

    /// Replaces every tree with one built from `records`.
    ///
    /// The new trees are built off to the side. If any record carries an
    /// unregistered attribute the error is returned and the current trees are
    /// kept.
    pub fn rebuild(&mut self, records: &[Arc<R>]) -> Result<()> {
        let mut fresh = Self::empty_indexes(&self.attributes, self.branching_factor)?;
        for record in records {
            for attr in record.attributes() {
                let tree = fresh
                    .get_mut(&attr.name)
                    .ok_or_else(|| LarderError::UnknownAttribute(attr.name.clone()))?;
                tree.insert(AttrValue(attr.value), Arc::clone(record));
            }
        }
        self.indexes = fresh;
        info!(
            records = records.len(),
            attributes = self.attributes.len(),
            "registry.rebuild.completed"
        );
        Ok(())
    }

    /// Inserts one record into the existing trees.
    ///
    /// All attributes are checked first, so an error leaves every tree as it was.
    pub fn add_one(&mut self, record: Arc<R>) -> Result<()> {
        if let Some(unknown) = record
            .attributes()
            .iter()
            .find(|attr| !self.indexes.contains_key(&attr.name))
        {
            return Err(LarderError::UnknownAttribute(unknown.name.clone()));
        }
        for attr in record.attributes() {
            if let Some(tree) = self.indexes.get_mut(&attr.name) {
                tree.insert(AttrValue(attr.value), Arc::clone(&record));
            }
        }
        debug!(id = record.identity(), "registry.add_one");
        Ok(())
    }

    /// Range search on one attribute's tree.
    ///
    /// An unregistered attribute is an error; an unrecognized operator is not
    /// and yields an empty result.
    pub fn search(&self, attribute: &str, operator: &str, bound: f64) -> Result<Vec<&Arc<R>>> {
        let tree = self
            .indexes
            .get(attribute)
            .ok_or_else(|| LarderError::UnknownAttribute(attribute.to_owned()))?;
        Ok(tree.range_search(&AttrValue(bound), operator))
    }
}

impl<R> IndexRegistry<R> {
    /// Registered attribute names in registration order.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Whether `attribute` has a tree.
    pub fn contains(&self, attribute: &str) -> bool {
        self.indexes.contains_key(attribute)
    }

    /// The tree backing `attribute`, if registered.
    pub fn index(&self, attribute: &str) -> Option<&OrderedIndex<AttrValue, Arc<R>>> {
        self.indexes.get(attribute)
    }

    /// Branching factor shared by every tree.
    pub fn branching_factor(&self) -> usize {
        self.branching_factor
    }

    /// Emits a stats snapshot for every tree.
    pub fn emit_stats(&self) {
        for (name, tree) in &self.indexes {
            tree.stats().emit_tracing(name);
        }
    }
}

impl<R> std::fmt::Debug for IndexRegistry<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexRegistry")
            .field("branching_factor", &self.branching_factor)
            .field("attributes", &self.attributes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::record::Record;

    fn protein_records() -> Vec<Arc<Record>> {
        [("1", "Beef", 39.0), ("2", "Eggs", 12.0), ("3", "Tuna", 40.0)]
            .into_iter()
            .map(|(id, name, protein)| Arc::new(Record::new(id, name).with_attribute("protein", protein)))
            .collect()
    }

    fn ids(found: &[&Arc<Record>]) -> Vec<String> {
        let mut ids: Vec<String> = found.iter().map(|r| r.id().to_owned()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn protein_lower_bound_returns_two_records() -> Result<()> {
        let mut registry = IndexRegistry::new(["protein", "fat"], 3)?;
        registry.rebuild(&protein_records())?;
        let found = registry.search("protein", ">=", 39.0)?;
        assert_eq!(ids(&found), vec!["1", "3"]);
        Ok(())
    }

    #[test]
    fn rejects_invalid_branching_factor() {
        let err = IndexRegistry::<Record>::new(["protein"], 2).unwrap_err();
        assert!(matches!(err, LarderError::InvalidBranchingFactor(2)));
    }

    #[test]
    fn unknown_attribute_in_search_is_an_error() -> Result<()> {
        let registry = IndexRegistry::<Record>::new(["protein"], 3)?;
        let err = registry.search("sugar", "<=", 1.0).unwrap_err();
        assert!(matches!(err, LarderError::UnknownAttribute(ref name) if name == "sugar"));
        Ok(())
    }

    #[test]
    fn unknown_operator_is_empty_not_error() -> Result<()> {
        let mut registry = IndexRegistry::new(["protein"], 3)?;
        registry.rebuild(&protein_records())?;
        assert!(registry.search("protein", "<", 100.0)?.is_empty());
        Ok(())
    }

    #[test]
    fn rebuild_replaces_previous_contents() -> Result<()> {
        let mut registry = IndexRegistry::new(["protein"], 3)?;
        registry.rebuild(&protein_records())?;
        let only = vec![Arc::new(Record::new("9", "Tofu").with_attribute("protein", 8.0))];
        registry.rebuild(&only)?;
        assert_eq!(ids(&registry.search("protein", ">=", 0.0)?), vec!["9"]);
        Ok(())
    }

    #[test]
    fn failed_rebuild_keeps_previous_trees() -> Result<()> {
        let mut registry = IndexRegistry::new(["protein"], 3)?;
        registry.rebuild(&protein_records())?;
        let bad = vec![Arc::new(Record::new("9", "Candy").with_attribute("sugar", 80.0))];
        assert!(registry.rebuild(&bad).is_err());
        assert_eq!(ids(&registry.search("protein", ">=", 0.0)?), vec!["1", "2", "3"]);
        Ok(())
    }

    #[test]
    fn add_one_is_all_or_nothing() -> Result<()> {
        let mut registry = IndexRegistry::new(["protein", "fat"], 3)?;
        registry.rebuild(&protein_records())?;
        let mixed = Record::new("7", "Mystery")
            .with_attribute("fat", 3.0)
            .with_attribute("sugar", 1.0);
        assert!(registry.add_one(Arc::new(mixed)).is_err());
        assert!(registry.search("fat", ">=", 0.0)?.is_empty());

        let ok = Record::new("8", "Salmon")
            .with_attribute("protein", 20.0)
            .with_attribute("fat", 13.0);
        registry.add_one(Arc::new(ok))?;
        assert_eq!(ids(&registry.search("protein", "<=", 20.0)?), vec!["2", "8"]);
        assert_eq!(ids(&registry.search("fat", "==", 13.0)?), vec!["8"]);
        Ok(())
    }

    #[test]
    fn attributes_keep_registration_order_without_duplicates() -> Result<()> {
        let registry = IndexRegistry::<Record>::new(["fat", "protein", "fat"], 4)?;
        assert_eq!(registry.attributes(), ["fat", "protein"]);
        assert!(registry.contains("protein"));
        assert!(registry.index("fat").is_some_and(|tree| tree.is_empty()));
        assert_eq!(registry.branching_factor(), 4);
        Ok(())
    }

    #[test]
    fn rebuilding_twice_answers_identically() -> Result<()> {
        let records: Vec<Arc<Record>> = (0..40)
            .map(|i| Arc::new(Record::new(i.to_string(), "x").with_attribute("protein", (i % 7) as f64)))
            .collect();
        let mut registry = IndexRegistry::new(["protein"], 3)?;
        registry.rebuild(&records)?;
        let first: Vec<Vec<String>> = (0..8)
            .flat_map(|b| ["<=", "==", ">="].map(move |op| (b, op)))
            .map(|(b, op)| registry.search("protein", op, b as f64).map(|r| ids(&r)))
            .collect::<Result<_>>()?;
        registry.rebuild(&records)?;
        let second: Vec<Vec<String>> = (0..8)
            .flat_map(|b| ["<=", "==", ">="].map(move |op| (b, op)))
            .map(|(b, op)| registry.search("protein", op, b as f64).map(|r| ids(&r)))
            .collect::<Result<_>>()?;
        assert_eq!(first, second);
        Ok(())
    }
}
