#![forbid(unsafe_code)]

//! Crate-wide error type and result alias.

use crate::cli::import_export::ImportError;
use crate::db::config::ConfigError;
use crate::query::errors::QueryError;

/// Errors surfaced by index construction, dataset lifecycle and queries.
#[derive(thiserror::Error, Debug)]
pub enum LarderError {
    /// Underlying I/O failure while saving.
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    /// A tree was requested with a branching factor of two or less.
    #[error("illegal branching factor {0}: must be greater than 2")]
    InvalidBranchingFactor(usize),
    /// A record carries an attribute that has no registered index.
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),
    /// Bulk load failed; the previously loaded dataset is unchanged.
    #[error(transparent)]
    Import(#[from] ImportError),
    /// A query could not be dispatched.
    #[error(transparent)]
    Query(#[from] QueryError),
    /// Dataset options were unreadable or inconsistent.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Caller supplied an argument outside the accepted domain.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LarderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branching_factor_error_names_the_value() {
        let err = LarderError::InvalidBranchingFactor(2);
        assert_eq!(err.to_string(), "illegal branching factor 2: must be greater than 2");
    }

    #[test]
    fn io_errors_convert() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: LarderError = io_err.into();
        assert!(matches!(err, LarderError::Io(_)));
    }
}
