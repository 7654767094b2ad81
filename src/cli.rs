use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{db::DEFAULT_MYSQL_PORT, identifier::DEFAULT_TABLE_PREFIX, loader::DEFAULT_BATCH_SIZE};

#[derive(Debug, Parser)]
#[command(author, version, about = "Load delimited files into MySQL with inferred schemas", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Inspect a file: infer column types and print the generated DDL
    Probe(ProbeArgs),
    /// Import a file into MySQL as one atomic, chunked transaction
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Input delimited file to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Field delimiter (supports ',', 'tab', ';', '|'); resolved from the
    /// file extension when omitted
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Prefix prepended to the sanitized file stem when naming the table
    #[arg(long = "table-prefix", default_value = DEFAULT_TABLE_PREFIX)]
    pub table_prefix: String,
    /// Character set recorded in the generated table definition
    #[arg(long, default_value = "utf8mb4")]
    pub charset: String,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Input delimited file to import
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Database server host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    /// Database server port
    #[arg(long, default_value_t = DEFAULT_MYSQL_PORT)]
    pub port: u16,
    /// Database user
    #[arg(short, long)]
    pub user: String,
    /// Database password; falls back to the MYSQL_PWD environment variable
    #[arg(short, long)]
    pub password: Option<String>,
    /// Target database (schema) name
    #[arg(short, long)]
    pub database: String,
    /// Connection and table character set
    #[arg(long, default_value = "utf8mb4")]
    pub charset: String,
    /// Rows per INSERT batch inside the single import transaction
    #[arg(long = "batch-size", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
    /// Prefix prepended to the sanitized file stem when naming the table
    #[arg(long = "table-prefix", default_value = DEFAULT_TABLE_PREFIX)]
    pub table_prefix: String,
    /// Field delimiter (supports ',', 'tab', ';', '|'); resolved from the
    /// file extension when omitted
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
