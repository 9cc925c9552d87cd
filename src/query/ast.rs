//! Parsed form of name filters and attribute rules.
//!
//! A rule is written `"<attribute> <operator> <bound>"`, for example
//! `"protein >= 12.5"`. The operator is stored as written; only the index
//! decides what it means.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::query::errors::QueryError;
use crate::storage::RangeOp;

/// A single-attribute range predicate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Predicate {
    /// Attribute name, trimmed and lowercased.
    pub attribute: String,
    /// Operator token exactly as supplied.
    pub operator: String,
    /// Finite numeric bound.
    pub bound: f64,
}

impl Predicate {
    /// Builds a predicate from parts, normalizing the attribute name.
    pub fn new(attribute: &str, operator: impl Into<String>, bound: f64) -> Self {
        Self {
            attribute: normalize_attribute(attribute),
            operator: operator.into(),
            bound,
        }
    }

    /// The operator, if it is one the index understands.
    pub fn op(&self) -> Option<RangeOp> {
        RangeOp::parse(&self.operator)
    }
}

impl FromStr for Predicate {
    type Err = QueryError;

    fn from_str(rule: &str) -> Result<Self, Self::Err> {
        let mut tokens = rule.split_whitespace();
        let (Some(attribute), Some(operator), Some(bound), None) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(QueryError::MalformedPredicate {
                rule: rule.to_owned(),
            });
        };
        let value: f64 = bound.parse().map_err(|_| QueryError::InvalidBound {
            rule: rule.to_owned(),
            bound: bound.to_owned(),
        })?;
        if !value.is_finite() {
            return Err(QueryError::NonFiniteBound {
                rule: rule.to_owned(),
            });
        }
        Ok(Predicate::new(attribute, operator, value))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.attribute, self.operator, self.bound)
    }
}

/// Lowercases and trims an attribute name the way the loader stores it.
pub fn normalize_attribute(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A name filter combined with an ordered list of attribute rules.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Query {
    /// Case-sensitive substring the record name must contain; `None` matches all.
    pub name_filter: Option<String>,
    /// Rules evaluated in order and intersected by record identity.
    pub predicates: Vec<Predicate>,
}

impl Query {
    /// Creates a query that matches every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether neither a name filter nor any rule is present.
    pub fn is_unconstrained(&self) -> bool {
        self.name_filter.as_deref().map_or(true, str::is_empty) && self.predicates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_tokens_and_normalizes_attribute() {
        let pred: Predicate = "  Protein   >=  12.5 ".parse().expect("valid rule");
        assert_eq!(pred.attribute, "protein");
        assert_eq!(pred.operator, ">=");
        assert_eq!(pred.bound, 12.5);
        assert_eq!(pred.op(), Some(RangeOp::Ge));
        assert_eq!(pred.to_string(), "protein >= 12.5");
    }

    #[test]
    fn keeps_unknown_operator_verbatim() {
        let pred: Predicate = "fat < 3".parse().expect("operator is not validated");
        assert_eq!(pred.operator, "<");
        assert_eq!(pred.op(), None);
    }

    #[test]
    fn rejects_wrong_token_counts() {
        for rule in ["", "fat", "fat <=", "fat <= 3 4"] {
            let err = rule.parse::<Predicate>().unwrap_err();
            assert!(matches!(err, QueryError::MalformedPredicate { .. }), "{rule:?}");
        }
    }

    #[test]
    fn rejects_bad_bounds() {
        let err = "fat <= lots".parse::<Predicate>().unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidBound {
                rule: "fat <= lots".into(),
                bound: "lots".into()
            }
        );
        for rule in ["fat <= NaN", "fat >= inf", "fat == -infinity"] {
            let err = rule.parse::<Predicate>().unwrap_err();
            assert!(matches!(err, QueryError::NonFiniteBound { .. }), "{rule:?}");
        }
    }

    #[test]
    fn empty_name_filter_is_unconstrained() {
        let mut query = Query::new();
        assert!(query.is_unconstrained());
        query.name_filter = Some(String::new());
        assert!(query.is_unconstrained());
        query.name_filter = Some("oat".into());
        assert!(!query.is_unconstrained());
    }
}
