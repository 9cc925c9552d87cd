#![forbid(unsafe_code)]

//! Record set lifecycle: bulk load, save, single additions and queries.
//!
//! A [`Dataset`] owns the records (sorted by name, case-insensitively) and
//! the index registry built from them. Loads are all-or-nothing: a load that
//! fails for any reason leaves the previous records and indexes in place.

/// Dataset options and their TOML loader.
pub mod config;

/// Meal selection and per-attribute totals.
pub mod meal;

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::cli::import_export::{self, ParsedRecords};
use crate::query::{Predicate, Query, QueryEngine};
use crate::storage::{IndexRegistry, Indexed, Record};
use crate::types::Result;

pub use config::{ConfigError, DatasetOptions};
pub use meal::{Meal, MealSummary};

/// Outcome of a successful bulk load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadSummary {
    /// Records now held by the dataset.
    pub loaded: usize,
    /// Input lines skipped for their field count.
    pub skipped: usize,
}

/// Records plus one ordered index per configured attribute.
#[derive(Debug)]
pub struct Dataset {
    options: DatasetOptions,
    records: Vec<Arc<Record>>,
    registry: IndexRegistry<Record>,
}

impl Dataset {
    /// Creates an empty dataset.
    ///
    /// Fails if the options are inconsistent or the branching factor is not
    /// greater than 2.
    pub fn new(options: DatasetOptions) -> Result<Self> {
        let options = options.validated()?;
        let registry = IndexRegistry::new(options.attributes.iter().cloned(), options.branching_factor)?;
        Ok(Self {
            options,
            records: Vec::new(),
            registry,
        })
    }

    pub fn options(&self) -> &DatasetOptions {
        &self.options
    }

    /// Replaces the dataset with the contents of `path`.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<LoadSummary> {
        let path = path.as_ref();
        let parsed = import_export::read_records(
            path,
            self.options.field_limits(),
            &self.options.attributes,
        );
        let outcome = parsed
            .map_err(Into::into)
            .and_then(|parsed| self.install(parsed));
        match &outcome {
            Ok(summary) => info!(
                path = %path.display(),
                loaded = summary.loaded,
                skipped = summary.skipped,
                "dataset.load.completed"
            ),
            Err(err) => warn!(path = %path.display(), error = %err, "dataset.load.failed"),
        }
        outcome
    }

    /// Replaces the dataset with records decoded from `input`.
    pub fn load_reader<R: Read>(&mut self, input: R) -> Result<LoadSummary> {
        let parsed = import_export::parse_records(
            input,
            self.options.field_limits(),
            &self.options.attributes,
        );
        let outcome = parsed
            .map_err(Into::into)
            .and_then(|parsed| self.install(parsed));
        match &outcome {
            Ok(summary) => info!(
                loaded = summary.loaded,
                skipped = summary.skipped,
                "dataset.load.completed"
            ),
            Err(err) => warn!(error = %err, "dataset.load.failed"),
        }
        outcome
    }

    fn install(&mut self, parsed: ParsedRecords) -> Result<LoadSummary> {
        let mut records: Vec<Arc<Record>> = parsed.records.into_iter().map(Arc::new).collect();
        sort_by_name(&mut records);
        self.registry.rebuild(&records)?;
        self.records = records;
        Ok(LoadSummary {
            loaded: self.records.len(),
            skipped: parsed.skipped,
        })
    }

    /// Writes every record to `path` in the current list order.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let written = import_export::write_records_to_path(path, self.records.iter().map(|r| r.as_ref()))?;
        info!(path = %path.display(), records = written, "dataset.save.completed");
        Ok(written)
    }

    /// Writes every record to `output` in the current list order.
    pub fn save_writer<W: Write>(&self, output: W) -> Result<usize> {
        let written = import_export::write_records(output, self.records.iter().map(|r| r.as_ref()))?;
        info!(records = written, "dataset.save.completed");
        Ok(written)
    }

    /// Indexes `record` into the existing trees and adds it to the list.
    ///
    /// Every attribute must be registered; otherwise nothing changes.
    pub fn add_record(&mut self, record: Record) -> Result<()> {
        let record = Arc::new(record);
        self.registry.add_one(Arc::clone(&record))?;
        self.records.push(record);
        sort_by_name(&mut self.records);
        Ok(())
    }

    /// Records sorted by name, case-insensitively.
    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn registry(&self) -> &IndexRegistry<Record> {
        &self.registry
    }

    /// Query engine over the current records.
    pub fn engine(&self) -> QueryEngine<'_, Record> {
        QueryEngine::new(&self.registry, &self.records)
    }

    /// Records whose name contains `needle` (case-sensitive).
    pub fn filter_by_name(&self, needle: &str) -> Vec<Arc<Record>> {
        self.engine().filter_by_name(needle)
    }

    /// Intersects the records matching every rule in `rules`.
    pub fn filter_by_rules(&self, rules: &[&str]) -> Result<Vec<Arc<Record>>> {
        let predicates = rules
            .iter()
            .map(|rule| rule.parse::<Predicate>())
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(self.engine().filter_by_predicates(&predicates)?)
    }

    pub fn query(&self, query: &Query) -> Result<Vec<Arc<Record>>> {
        Ok(self.engine().execute(query)?)
    }

    /// Looks a record up by identity.
    pub fn find(&self, id: &str) -> Option<&Arc<Record>> {
        self.records.iter().find(|record| record.identity() == id)
    }
}

fn sort_by_name(records: &mut [Arc<Record>]) {
    records.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));
}
