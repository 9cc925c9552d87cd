#![forbid(unsafe_code)]
#![allow(missing_docs)]

use std::fmt;

use thiserror::Error;

/// Errors raised while parsing or dispatching a query.
///
/// An unrecognized comparison operator is deliberately absent: it is carried
/// through to the index and produces an empty match set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Rule did not split into `<attribute> <operator> <bound>`.
    #[error("rule '{rule}' must have the form '<attribute> <operator> <bound>'")]
    MalformedPredicate { rule: String },
    /// Bound token is not a decimal number.
    #[error("bound '{bound}' in rule '{rule}' is not a number")]
    InvalidBound { rule: String, bound: String },
    /// Bound parsed to NaN or an infinity.
    #[error("bound in rule '{rule}' must be finite")]
    NonFiniteBound { rule: String },
    /// Rule names an attribute without an index.
    #[error("unknown attribute '{attribute}'")]
    UnknownAttribute { attribute: String },
}

impl QueryError {
    /// Returns a machine-readable code for the error variant.
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::MalformedPredicate { .. } => "MalformedPredicate",
            QueryError::InvalidBound { .. } => "InvalidBound",
            QueryError::NonFiniteBound { .. } => "InvalidBound",
            QueryError::UnknownAttribute { .. } => "UnknownAttribute",
        }
    }
}

/// Formats a query error prefixed with its code.
pub struct QueryErrorWithCode<'a>(pub &'a QueryError);

impl fmt::Display for QueryErrorWithCode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.0.code(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_prefix_display() {
        let err = QueryError::UnknownAttribute {
            attribute: "sugar".into(),
        };
        assert_eq!(
            QueryErrorWithCode(&err).to_string(),
            "[UnknownAttribute] unknown attribute 'sugar'"
        );
        let err = QueryError::NonFiniteBound { rule: "fat <= inf".into() };
        assert_eq!(err.code(), "InvalidBound");
    }
}
