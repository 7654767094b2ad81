//! Table definition building and statement rendering.
//!
//! Consumes per-column inferred types and produces the create/drop/insert
//! statements for one target table. Normalization fix-ups run here, after
//! inference and in a fixed order: VARCHAR columns flatten to the configured
//! fixed length, TIME promotes to DATETIME, and any kind the storage layer
//! does not accept directly falls back to a maximum-length VARCHAR. A
//! name-based DATETIME override runs last and unconditionally. Every table
//! gains a trailing `import_time` column stamped by the server at insert.

use itertools::Itertools;

use crate::{
    identifier::quote,
    infer::{InferenceConfig, InferredColumn, SqlType},
};

pub const IMPORT_TIME_COLUMN: &str = "import_time";

/// A complete target-table description; immutable once built.
#[derive(Debug, Clone)]
pub struct TableDefinition {
    pub table_name: String,
    pub columns: Vec<InferredColumn>,
    pub charset: String,
}

/// Applies the normalization fix-ups to one inferred column type.
fn normalize_type(sql_type: SqlType, config: &InferenceConfig) -> SqlType {
    match sql_type {
        SqlType::VarChar(_) => {
            if config.max_varchar_length < 255 {
                SqlType::VarChar(config.max_varchar_length)
            } else {
                SqlType::VarChar(config.varchar_length)
            }
        }
        SqlType::Time => SqlType::DateTime,
        SqlType::Integer
        | SqlType::BigInteger
        | SqlType::Double
        | SqlType::DateTime
        | SqlType::Decimal { .. } => sql_type,
        // TEXT and DATE have no direct slot in the emitted schema.
        _ => SqlType::VarChar(config.max_varchar_length),
    }
}

/// Builds the table definition from inferred columns.
///
/// The datetime-name override is applied after content-based normalization
/// and is unconditional: a column named like a date or time is DATETIME in
/// the final schema no matter what inference decided.
pub fn build(
    table_name: &str,
    inferred: Vec<InferredColumn>,
    config: &InferenceConfig,
    charset: &str,
) -> TableDefinition {
    let columns = inferred
        .into_iter()
        .map(|column| {
            let mut sql_type = normalize_type(column.sql_type, config);
            if config.datetime_named(&column.name) {
                sql_type = SqlType::DateTime;
            }
            InferredColumn {
                name: column.name,
                sql_type,
            }
        })
        .collect();
    TableDefinition {
        table_name: table_name.to_string(),
        columns,
        charset: charset.to_string(),
    }
}

impl TableDefinition {
    /// Renders the `CREATE TABLE IF NOT EXISTS` statement, trailing
    /// `import_time` column included.
    pub fn create_statement(&self) -> String {
        let mut sql = String::from("CREATE TABLE IF NOT EXISTS ");
        sql.push_str(&quote(&self.table_name));
        sql.push_str(" (");
        for column in &self.columns {
            sql.push_str("\n\t");
            sql.push_str(&quote(&column.name));
            sql.push(' ');
            sql.push_str(&column.sql_type.render());
            sql.push(',');
        }
        sql.push_str("\n\t");
        sql.push_str(&quote(IMPORT_TIME_COLUMN));
        sql.push_str(" TIMESTAMP DEFAULT CURRENT_TIMESTAMP");
        sql.push_str(&format!(
            "\n) ENGINE=InnoDB DEFAULT CHARSET={};",
            self.charset
        ));
        sql
    }

    pub fn drop_statement(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quote(&self.table_name))
    }

    /// Renders one multi-row parameterized INSERT for `row_count` rows.
    /// `import_time` is omitted so the server default applies.
    pub fn insert_statement(&self, row_count: usize) -> String {
        let column_list = self.columns.iter().map(|c| quote(&c.name)).join(", ");
        let row_placeholders = format!(
            "({})",
            self.columns.iter().map(|_| "?").join(", ")
        );
        let values = (0..row_count).map(|_| row_placeholders.as_str()).join(", ");
        format!(
            "INSERT INTO {} ({column_list}) VALUES {values}",
            quote(&self.table_name)
        )
    }
}
