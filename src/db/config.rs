use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::import_export::FieldLimits;
use crate::query::ast::normalize_attribute;

/// Attributes indexed when no configuration says otherwise.
pub const DEFAULT_ATTRIBUTES: [&str; 5] = ["calories", "fat", "carbohydrate", "fiber", "protein"];

/// Options fixed for the lifetime of a [`Dataset`](crate::db::Dataset).
///
/// ```toml
/// branching_factor = 3
/// attributes = ["calories", "fat", "carbohydrate", "fiber", "protein"]
/// min_fields = 2
/// max_fields = 12
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetOptions {
    /// Key count at which an index node splits. Must be greater than 2.
    pub branching_factor: usize,
    /// Closed set of indexed attribute names.
    pub attributes: Vec<String>,
    /// Lines with fewer fields are skipped on load.
    pub min_fields: usize,
    /// Lines with more fields are skipped on load.
    pub max_fields: usize,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            branching_factor: 3,
            attributes: DEFAULT_ATTRIBUTES.iter().map(|name| name.to_string()).collect(),
            min_fields: 2,
            max_fields: 12,
        }
    }
}

impl DatasetOptions {
    /// Reads and validates options from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let options: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        options.validated()
    }

    /// Parses and validates options from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let options: Self =
            toml::from_str(contents).map_err(|source| ConfigError::ParseStr { source })?;
        options.validated()
    }

    pub fn with_branching_factor(mut self, branching_factor: usize) -> Self {
        self.branching_factor = branching_factor;
        self
    }

    /// Normalizes attribute names and checks the field bounds.
    ///
    /// The branching factor is checked when the index registry is created.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let mut names: Vec<String> = Vec::with_capacity(self.attributes.len());
        for raw in &self.attributes {
            let name = normalize_attribute(raw);
            if name.is_empty() {
                return Err(ConfigError::Invalid("attribute names must not be empty".into()));
            }
            if names.contains(&name) {
                return Err(ConfigError::Invalid(format!("attribute '{name}' listed twice")));
            }
            names.push(name);
        }
        self.attributes = names;
        if self.min_fields < 2 {
            return Err(ConfigError::Invalid(format!(
                "min_fields must be at least 2 (got {})",
                self.min_fields
            )));
        }
        if self.max_fields < self.min_fields {
            return Err(ConfigError::Invalid(format!(
                "max_fields {} is below min_fields {}",
                self.max_fields, self.min_fields
            )));
        }
        Ok(self)
    }

    /// Field-count bounds for the bulk loader.
    pub fn field_limits(&self) -> FieldLimits {
        FieldLimits {
            min: self.min_fields,
            max: self.max_fields,
        }
    }
}

/// Errors raised while reading dataset options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Config file is not valid TOML for these options.
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },
    /// Inline TOML is not valid for these options.
    #[error("failed to parse config: {source}")]
    ParseStr {
        /// Underlying error.
        source: toml::de::Error,
    },
    /// Options parsed but are inconsistent.
    #[error("invalid config: {0}")]
    Invalid(String),
}
