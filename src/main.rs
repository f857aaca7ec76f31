//! # sheetdrop CLI
//!
//! The `sheetdrop` binary serves the HTTP API and runs the ingest pipeline
//! against local files for quick inspection.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `sheetdrop serve` | Start the HTTP server |
//! | `sheetdrop process <file>` | Parse and normalize a local spreadsheet |
//! | `sheetdrop search <file> <query>` | Parse a local spreadsheet and search it |
//!
//! All commands accept a `--config` flag pointing to a TOML configuration
//! file; built-in defaults apply when the file does not exist.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use sheetdrop::config::{self, Config};
use sheetdrop::ingest;
use sheetdrop::normalize;
use sheetdrop::search::search_records;
use sheetdrop::server;

#[derive(Parser)]
#[command(
    name = "sheetdrop",
    about = "A spreadsheet upload, preview, and search service",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply if it does not exist.
    #[arg(long, global = true, default_value = "./config/sheetdrop.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Creates the upload and image directories and serves the JSON API on
    /// the configured bind address until terminated.
    Serve,

    /// Parse and normalize a local spreadsheet, printing a preview.
    Process {
        /// Path to a .csv or .xlsx file.
        file: PathBuf,

        /// Maximum preview rows to print.
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },

    /// Parse a local spreadsheet and search its records.
    Search {
        /// Path to a .csv or .xlsx file.
        file: PathBuf,

        /// Case-insensitive substring to look for in any field.
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("sheetdrop=info")),
                )
                .init();
            server::run_server(&config).await
        }
        Commands::Process { file, limit } => run_process(&config, &file, limit),
        Commands::Search { file, query } => run_search(&config, &file, &query),
    }
}

fn run_process(config: &Config, file: &Path, limit: usize) -> Result<()> {
    let table = ingest::read_table(file)?;

    println!("process {}", file.display());
    if table.is_empty() {
        println!("  rows: 0");
        println!("ok");
        return Ok(());
    }

    let records = normalize::normalize_table(&table, &config.server.public_base());
    println!("  rows: {}", records.len());
    if let Some(first) = records.first() {
        let columns: Vec<&str> = first.keys().map(String::as_str).collect();
        println!("  columns: {}", columns.join(", "));
    }
    for record in records.iter().take(limit) {
        println!("  {}", serde_json::to_string(record)?);
    }
    println!("ok");
    Ok(())
}

fn run_search(config: &Config, file: &Path, query: &str) -> Result<()> {
    let table = ingest::read_table(file)?;
    let records = normalize::normalize_table(&table, &config.server.public_base());
    let results = search_records(&records, query);

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!("search {} in {}", query, file.display());
    println!("  matches: {}", results.len());
    for record in &results {
        println!("  {}", serde_json::to_string(record)?);
    }
    Ok(())
}
