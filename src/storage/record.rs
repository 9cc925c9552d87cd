use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// Numeric attribute value with a total order, usable as an index key.
///
/// Ordering follows [`f64::total_cmp`], so every value (including `-0.0`)
/// has a fixed position. The loader rejects non-finite input, which keeps
/// indexed keys in the ordinary numeric order.
#[derive(Copy, Clone, Serialize)]
#[serde(transparent)]
pub struct AttrValue(pub f64);

impl AttrValue {
    /// Returns the wrapped number.
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AttrValue {}

impl PartialOrd for AttrValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AttrValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue(value)
    }
}

impl fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named numeric attribute carried by a record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attribute {
    /// Attribute name, normalized to lowercase by the loader.
    pub name: String,
    /// Attribute value.
    pub value: f64,
}

/// Contract the registry and query engine need from an indexed value.
///
/// The index never looks inside a record on its own; the registry asks for the
/// attributes and decides which tree receives each value.
pub trait Indexed {
    /// Stable identity used to intersect result sets.
    fn identity(&self) -> &str;
    /// Display name matched by substring filters.
    fn name(&self) -> &str;
    /// Attributes in the record's own iteration order.
    fn attributes(&self) -> &[Attribute];
}

/// A record with an identity, a name and insertion-ordered numeric attributes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    id: String,
    name: String,
    attributes: Vec<Attribute>,
}

impl Record {
    /// Creates a record without attributes.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Builder-style variant of [`Record::set_attribute`].
    pub fn with_attribute(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Sets an attribute, replacing the value in place if the name already exists.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    /// Looks up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<f64> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value)
    }

    /// Record identity.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Indexed for Record {
    fn identity(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}
