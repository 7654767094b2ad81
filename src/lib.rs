pub mod cli;
pub mod datetime;
pub mod db;
pub mod ddl;
pub mod identifier;
pub mod infer;
pub mod loader;
pub mod parse;
pub mod report;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info, warn};

use crate::{
    cli::{Cli, Commands},
    infer::{InferenceConfig, TypeInference},
    loader::{ImportOptions, Importer},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_ingest", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Probe(args) => handle_probe(&args),
        Commands::Import(args) => handle_import(args),
    }
}

fn handle_probe(args: &cli::ProbeArgs) -> Result<()> {
    info!("probing '{}'", args.input.display());
    let options = ImportOptions {
        table_prefix: args.table_prefix.clone(),
        charset: args.charset.clone(),
        delimiter: args.delimiter,
        ..ImportOptions::default()
    };
    let inference = TypeInference::new(InferenceConfig::default());
    let (definition, parsed) = Importer::plan(&options, &inference, &args.input)
        .with_context(|| format!("Inspecting {:?}", args.input))?;
    for warning in &parsed.warnings {
        warn!("{warning}");
    }
    info!(
        "inferred {} column(s) from {} row(s)",
        definition.columns.len(),
        parsed.row_count()
    );
    println!("{}", definition.create_statement());
    Ok(())
}

fn handle_import(args: cli::ImportArgs) -> Result<()> {
    let cli::ImportArgs {
        input,
        host,
        port,
        user,
        password,
        database,
        charset,
        batch_size,
        table_prefix,
        delimiter,
    } = args;

    let password = password
        .or_else(|| env::var("MYSQL_PWD").ok())
        .unwrap_or_default();
    let db_config = db::DbConfig {
        host,
        port,
        user,
        password,
        database,
        charset: charset.clone(),
    };
    let runtime = tokio::runtime::Runtime::new().context("Building async runtime")?;
    let _runtime_guard = runtime.enter();
    let pool = db::connect_pool(&db_config).context("Building connection pool")?;
    let options = ImportOptions {
        batch_size,
        table_prefix,
        charset,
        delimiter,
    };
    let importer = Importer::new(pool, options, InferenceConfig::default());

    let report = runtime.block_on(importer.import_file(&input));

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Serializing import report")?
    );
    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
