//! Defensive parsing of delimited text into raw string cells.
//!
//! Everything is read as text: type decisions belong to the inference engine,
//! never to the parser. The reader tolerates what real exports contain —
//! UTF-8 byte-order marks, stray quoting, malformed rows — by decoding
//! through `encoding_rs_io` (BOM sniffed, bad sequences replaced), stripping
//! one residual quote layer per cell, and skipping unparseable rows with a
//! recorded warning instead of aborting the load. Two cleaning passes run
//! before the parse result is handed on: known money columns coerce to
//! numeric text and name-flagged datetime columns coerce to one canonical
//! representation, with invalid values becoming null markers in both.

use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

use csv::ReaderBuilder;
use encoding_rs::UTF_8;
use encoding_rs_io::DecodeReaderBytesBuilder;
use log::debug;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    datetime,
    identifier::{self, strip_outer_quotes},
    infer::InferenceConfig,
};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

/// Fatal parse failures. Malformed data rows are not here on purpose: they
/// degrade to warnings, and only an unreadable file or header aborts.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("opening input file {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("reading header row: {0}")]
    Header(#[from] csv::Error),
    #[error("input file has no usable columns")]
    NoColumns,
}

/// One source column: the header as found in the file and its sanitized form.
#[derive(Debug, Clone)]
pub struct ParsedColumn {
    pub raw_name: String,
    pub name: String,
}

/// The parse result: sanitized columns, row-major cells, accumulated
/// warnings. `None` cells are null markers produced by padding or cleaning.
#[derive(Debug)]
pub struct ParsedFile {
    pub columns: Vec<ParsedColumn>,
    pub rows: Vec<Vec<Option<String>>>,
    pub warnings: Vec<String>,
}

impl ParsedFile {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Materializes one column's cells for read-only inference.
    pub fn column_values(&self, index: usize) -> Vec<Option<String>> {
        self.rows
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or(None))
            .collect()
    }
}

/// Extension-based delimiter resolution with manual override.
pub fn resolve_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

/// Reads a delimited file into raw string cells and runs the cleaning passes.
///
/// The header row is required; a file whose header cannot be read is a fatal
/// input error. Data rows with extra fields are skipped with a warning; rows
/// with missing fields are padded with null markers.
pub fn read_delimited(
    path: &Path,
    delimiter: u8,
    config: &InferenceConfig,
) -> Result<ParsedFile, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Open {
        path: path.display().to_string(),
        source,
    })?;
    // UTF-8 by default; a byte-order mark overrides and is consumed.
    let decoder = DecodeReaderBytesBuilder::new()
        .encoding(Some(UTF_8))
        .bom_override(true)
        .build(BufReader::new(file));
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .double_quote(true)
        .flexible(true)
        .from_reader(decoder);

    let header_record = reader.headers()?.clone();
    let columns: Vec<ParsedColumn> = header_record
        .iter()
        .map(|header| {
            let raw = strip_outer_quotes(header).to_string();
            ParsedColumn {
                name: identifier::sanitize(&raw),
                raw_name: raw,
            }
        })
        .collect();
    if columns.is_empty() {
        return Err(ParseError::NoColumns);
    }

    let mut warnings = Vec::new();
    let mut seen_names = HashSet::new();
    for column in &columns {
        if !seen_names.insert(column.name.as_str()) {
            warnings.push(format!(
                "duplicate column name '{}' after sanitization",
                column.name
            ));
        }
    }

    let expected = columns.len();
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                let line = err.position().map(|p| p.line()).unwrap_or_default();
                warnings.push(format!("skipped malformed row at line {line}: {err}"));
                continue;
            }
        };
        if record.len() > expected {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            warnings.push(format!(
                "skipped row at line {line}: expected {expected} field(s), found {}",
                record.len()
            ));
            continue;
        }
        let mut cells: Vec<Option<String>> = record
            .iter()
            .map(|cell| Some(strip_outer_quotes(cell).to_string()))
            .collect();
        cells.resize(expected, None);
        rows.push(cells);
    }

    let mut parsed = ParsedFile {
        columns,
        rows,
        warnings,
    };
    coerce_money_columns(&mut parsed, config);
    coerce_datetime_columns(&mut parsed, config);
    debug!(
        "parsed {} row(s) across {} column(s), {} warning(s)",
        parsed.row_count(),
        parsed.columns.len(),
        parsed.warnings.len()
    );
    Ok(parsed)
}

/// Known money-like columns become numeric text; anything unparseable is a
/// null marker, never a row failure.
fn coerce_money_columns(parsed: &mut ParsedFile, config: &InferenceConfig) {
    let targets: Vec<usize> = parsed
        .columns
        .iter()
        .enumerate()
        .filter(|(_, column)| config.money_named(&column.name))
        .map(|(idx, _)| idx)
        .collect();
    for row in &mut parsed.rows {
        for &idx in &targets {
            let coerced = row[idx]
                .as_deref()
                .and_then(|value| value.trim().parse::<Decimal>().ok())
                .map(|decimal| decimal.to_string());
            row[idx] = coerced;
        }
    }
}

/// Name-flagged datetime columns collapse to one canonical text form.
fn coerce_datetime_columns(parsed: &mut ParsedFile, config: &InferenceConfig) {
    let targets: Vec<usize> = parsed
        .columns
        .iter()
        .enumerate()
        .filter(|(_, column)| config.datetime_named(&column.name))
        .map(|(idx, _)| idx)
        .collect();
    for row in &mut parsed.rows {
        for &idx in &targets {
            let coerced = row[idx]
                .as_deref()
                .and_then(|value| datetime::canonicalize(value, &config.datetime_patterns));
            row[idx] = coerced;
        }
    }
}
