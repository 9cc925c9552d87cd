#![forbid(unsafe_code)]

//! Delimited-text import and export.

/// Line codec for `id,name,attr,value,...` files.
pub mod import_export;

pub use import_export::{FieldLimits, ImportError, ParsedRecords};
