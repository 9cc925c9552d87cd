use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use thiserror::Error;
use tracing::debug;

use crate::query::ast::normalize_attribute;
use crate::storage::{Indexed, Record};

/// Error type for delimited-text load and save.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Input file could not be opened.
    #[error("cannot open '{}': {source}", path.display())]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// IO error while reading or writing.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// CSV reader or writer error.
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// Attribute value is not a finite decimal number.
    #[error("line {line}: value '{value}' for attribute '{attribute}' is not a number")]
    InvalidNumber {
        /// One-based input line.
        line: u64,
        /// Normalized attribute name.
        attribute: String,
        /// Raw value text.
        value: String,
    },
    /// Attribute name is the last field of the line.
    #[error("line {line}: attribute '{attribute}' has no value")]
    MissingValue {
        /// One-based input line.
        line: u64,
        /// Normalized attribute name.
        attribute: String,
    },
    /// Attribute has no registered index.
    #[error("line {line}: attribute '{attribute}' is not indexed")]
    UnknownAttribute {
        /// One-based input line.
        line: u64,
        /// Normalized attribute name.
        attribute: String,
    },
}

/// Field-count bounds; lines outside them are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimits {
    /// Smallest accepted field count.
    pub min: usize,
    /// Largest accepted field count.
    pub max: usize,
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self { min: 2, max: 12 }
    }
}

/// Records decoded from one input plus the number of skipped lines.
#[derive(Debug, Default)]
pub struct ParsedRecords {
    /// Decoded records in input order.
    pub records: Vec<Record>,
    /// Lines dropped for having too few or too many fields.
    pub skipped: usize,
}

/// Opens `path` and decodes it with [`parse_records`].
pub fn read_records(
    path: &Path,
    limits: FieldLimits,
    attributes: &[String],
) -> Result<ParsedRecords, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(file, limits, attributes)
}

/// Decodes `id,name,attr,value,...` lines.
///
/// Trailing empty fields are dropped before the field count is checked.
/// Attribute names are trimmed and lowercased and must appear in
/// `attributes`. The first bad value aborts the whole decode.
pub fn parse_records<R: Read>(
    input: R,
    limits: FieldLimits,
    attributes: &[String],
) -> Result<ParsedRecords, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(input);
    let mut parsed = ParsedRecords::default();
    for result in reader.records() {
        let row = result?;
        let line = row.position().map_or(0, |pos| pos.line());
        let fields = significant_fields(&row);
        if fields.len() < limits.min || fields.len() > limits.max {
            debug!(line, fields = fields.len(), "dataset.load.skipped_line");
            parsed.skipped += 1;
            continue;
        }
        parsed.records.push(decode_row(line, &fields, attributes)?);
    }
    Ok(parsed)
}

fn significant_fields(row: &StringRecord) -> Vec<&str> {
    let mut fields: Vec<&str> = row.iter().collect();
    while fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }
    fields
}

fn decode_row(line: u64, fields: &[&str], attributes: &[String]) -> Result<Record, ImportError> {
    let mut record = Record::new(fields[0], fields[1]);
    for pair in fields[2..].chunks(2) {
        let attribute = normalize_attribute(pair[0]);
        if !attributes.contains(&attribute) {
            return Err(ImportError::UnknownAttribute { line, attribute });
        }
        let Some(raw) = pair.get(1) else {
            return Err(ImportError::MissingValue { line, attribute });
        };
        let value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ImportError::InvalidNumber {
                line,
                attribute: attribute.clone(),
                value: (*raw).to_owned(),
            })?;
        record.set_attribute(attribute, value);
    }
    Ok(record)
}

/// Creates `path` and writes `records` to it with [`write_records`].
pub fn write_records_to_path<'a, I>(path: &Path, records: I) -> Result<usize, ImportError>
where
    I: IntoIterator<Item = &'a Record>,
{
    let file = File::create(path)?;
    write_records(file, records)
}

/// Writes one `id,name,attr,value,...` line per record, attributes in the
/// record's own order. Returns the number of records written.
pub fn write_records<'a, W, I>(output: W, records: I) -> Result<usize, ImportError>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(output);
    let mut written = 0usize;
    for record in records {
        let mut row = Vec::with_capacity(2 + record.attributes().len() * 2);
        row.push(record.id().to_owned());
        row.push(record.name().to_owned());
        for attr in record.attributes() {
            row.push(attr.name.clone());
            row.push(attr.value.to_string());
        }
        writer.write_record(&row)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}
