//! Identifier sanitation for table and column names.
//!
//! Source files arrive with arbitrary headers: quoted, mixed-case, Unicode,
//! punctuation-laden. Everything that ends up in a DDL or DML statement flows
//! through [`sanitize`] first, so the storage engine only ever sees
//! `[a-z0-9_]` identifiers.

use std::{path::Path, sync::OnceLock};

use regex::Regex;

pub const DEFAULT_TABLE_PREFIX: &str = "data_";
const TABLE_NAME_MAX_CHARS: usize = 50;

fn illegal_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_]+").expect("static identifier pattern"))
}

/// Strips one layer of surrounding double quotes from a raw header or cell.
pub fn strip_outer_quotes(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed)
}

/// Reduces an arbitrary name to a storage-legal identifier.
///
/// One layer of enclosing double quotes is removed, every run of characters
/// outside `[a-zA-Z0-9_]` collapses to a single underscore, and the result is
/// lowercased. Total over any input; the empty string maps to itself.
pub fn sanitize(name: &str) -> String {
    let unquoted = strip_outer_quotes(name);
    illegal_runs()
        .replace_all(unquoted, "_")
        .to_ascii_lowercase()
}

/// Derives the target table name from the input file path.
///
/// The file stem is sanitized, truncated to 50 characters, and prefixed. Two
/// files with stems that sanitize alike derive the same table name; the
/// loader's drop-and-recreate policy makes that a silent overwrite.
pub fn table_name(path: &Path, prefix: &str) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let sanitized = sanitize(stem);
    let truncated: String = sanitized.chars().take(TABLE_NAME_MAX_CHARS).collect();
    format!("{prefix}{truncated}")
}

/// Wraps an already-sanitized identifier in backticks for MySQL statements.
pub fn quote(identifier: &str) -> String {
    format!("`{identifier}`")
}
