//! The import orchestrator: parse → infer → build → load, one transaction.
//!
//! Data flows one direction through the pipeline and the whole load is
//! all-or-nothing at file granularity: the generated table is dropped and
//! recreated inside the same transaction that streams the row batches, so a
//! failure in batch N discards every batch before it. Callers always get an
//! [`ImportReport`] back — no failure escapes `import_file` as an error.

use std::path::Path;

use log::{debug, error, info, warn};
use sqlx::MySqlPool;
use thiserror::Error;

use crate::{
    db::{MySqlTx, StorageError, StoreTx},
    ddl::{self, TableDefinition},
    identifier,
    infer::{InferenceConfig, InferredColumn, TypeInference},
    parse::{self, ParseError, ParsedFile},
    report::ImportReport,
};

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Per-importer settings independent of the inference rule set.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Rows per INSERT statement inside the single transaction.
    pub batch_size: usize,
    /// Prefix prepended to the sanitized file stem when naming the table.
    pub table_prefix: String,
    /// Character set recorded in the generated table definition.
    pub charset: String,
    /// Field delimiter override; resolved from the file extension when unset.
    pub delimiter: Option<u8>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            table_prefix: identifier::DEFAULT_TABLE_PREFIX.to_string(),
            charset: "utf8mb4".to_string(),
            delimiter: None,
        }
    }
}

/// Failure taxonomy at the import boundary. The category, not just the
/// message, is part of the report contract: callers distinguish bad input
/// from a bad store.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ImportError {
    fn categorized_message(&self) -> String {
        match self {
            ImportError::Parse(err) => format!("csv parse failure: {err}"),
            ImportError::Storage(err) => format!("database error: {err}"),
        }
    }
}

/// The schema-inferring batch importer. One instance may serve many calls;
/// each call checks out one pooled connection and one transaction.
///
/// Reimporting a file whose stem sanitizes to an existing table name drops
/// and fully replaces that table. This is deliberate idempotent-reimport
/// behavior and it is destructive; callers that need accumulation must name
/// their files apart. Two concurrent imports that derive the same table name
/// race on drop/create and must not be run together.
pub struct Importer {
    pool: MySqlPool,
    options: ImportOptions,
    inference: TypeInference,
}

impl Importer {
    pub fn new(pool: MySqlPool, options: ImportOptions, config: InferenceConfig) -> Self {
        Self {
            pool,
            options,
            inference: TypeInference::new(config),
        }
    }

    /// Imports one file, returning the outcome report. Never fails: every
    /// error is absorbed into a `status=error` report with a categorized
    /// message, and the transaction is rolled back before the report is
    /// assembled.
    pub async fn import_file(&self, path: &Path) -> ImportReport {
        let table_name = identifier::table_name(path, &self.options.table_prefix);
        let mut warnings = Vec::new();
        match self.run(path, &table_name, &mut warnings).await {
            Ok(rows_imported) => {
                info!("imported {rows_imported} row(s) into {table_name}");
                ImportReport::success(table_name, rows_imported, warnings)
            }
            Err(err) => {
                let message = err.categorized_message();
                error!("import of '{}' failed: {message}", path.display());
                ImportReport::failure(table_name, warnings, message)
            }
        }
    }

    /// Builds the table definition for a file without touching the store.
    /// This is the `probe` surface: the same parse/infer/build path the
    /// import takes, stopping short of the transaction.
    pub fn plan(
        options: &ImportOptions,
        inference: &TypeInference,
        path: &Path,
    ) -> Result<(TableDefinition, ParsedFile), ParseError> {
        let delimiter = parse::resolve_delimiter(path, options.delimiter);
        let parsed = parse::read_delimited(path, delimiter, inference.config())?;
        let inferred: Vec<InferredColumn> = parsed
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| InferredColumn {
                name: column.name.clone(),
                sql_type: inference.infer(&parsed.column_values(index), &column.name),
            })
            .collect();
        let table_name = identifier::table_name(path, &options.table_prefix);
        let definition = ddl::build(&table_name, inferred, inference.config(), &options.charset);
        Ok((definition, parsed))
    }

    async fn run(
        &self,
        path: &Path,
        table_name: &str,
        warnings: &mut Vec<String>,
    ) -> Result<u64, ImportError> {
        info!("starting import of '{}' as {table_name}", path.display());
        let (definition, parsed) = Self::plan(&self.options, &self.inference, path)?;
        for warning in &parsed.warnings {
            warn!("{warning}");
        }
        warnings.extend(parsed.warnings.iter().cloned());
        debug!("generated DDL:\n{}", definition.create_statement());

        let tx = MySqlTx::begin(&self.pool).await?;
        let rows_imported =
            load_rows(tx, &definition, &parsed.rows, self.options.batch_size).await?;
        Ok(rows_imported)
    }
}

/// Recreates the table and streams all rows in bounded batches, committing
/// once at the end. Any failure rolls the whole transaction back before the
/// error propagates; nothing persists from a failed call.
pub async fn load_rows<T: StoreTx>(
    mut tx: T,
    definition: &TableDefinition,
    rows: &[Vec<Option<String>>],
    batch_size: usize,
) -> Result<u64, StorageError> {
    match load_within(&mut tx, definition, rows, batch_size).await {
        Ok(rows_imported) => {
            tx.commit().await?;
            Ok(rows_imported)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!("rollback after failed load also failed: {rollback_err}");
            }
            Err(err)
        }
    }
}

async fn load_within<T: StoreTx>(
    tx: &mut T,
    definition: &TableDefinition,
    rows: &[Vec<Option<String>>],
    batch_size: usize,
) -> Result<u64, StorageError> {
    info!("recreating table {}", definition.table_name);
    tx.execute(&definition.drop_statement()).await?;
    tx.execute(&definition.create_statement()).await?;

    let total = rows.len();
    let mut rows_imported = 0u64;
    for batch in rows.chunks(batch_size.max(1)) {
        let statement = definition.insert_statement(batch.len());
        let params: Vec<Option<String>> = batch.iter().flatten().cloned().collect();
        tx.execute_with_params(&statement, params).await?;
        rows_imported += batch.len() as u64;
        info!(
            "loaded {}/{} row(s) into {}",
            rows_imported, total, definition.table_name
        );
    }
    Ok(rows_imported)
}
