//! The structured outcome record returned by every import call.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Success,
    Error,
}

/// Machine-readable import outcome. Returned once per call; the importer
/// keeps no reference after handing it back.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub status: ImportStatus,
    pub table: String,
    pub rows_imported: u64,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ImportReport {
    pub fn success(table: String, rows_imported: u64, warnings: Vec<String>) -> Self {
        Self {
            status: ImportStatus::Success,
            table,
            rows_imported,
            warnings,
            message: None,
        }
    }

    /// An error report. `rows_imported` is always 0: the transaction rolled
    /// back, so no rows persisted regardless of how far the load got.
    pub fn failure(table: String, warnings: Vec<String>, message: String) -> Self {
        Self {
            status: ImportStatus::Error,
            table,
            rows_imported: 0,
            warnings,
            message: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ImportStatus::Success
    }
}
