//! Holocron Import - Main entry point
//!
//! One-shot catalog import runner. Connects to the configured database,
//! applies pending migrations and runs the full import pipeline once.
//! Unlike the server's background worker, failures propagate to the exit
//! code so schedulers and operators can see them.

use anyhow::Result;
use clap::Parser;
use holocron_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use holocron_server::config::Config;
use holocron_server::ingest::swapi::{run_once, SwapiConfig};
use sqlx::postgres::PgPoolOptions;
use std::{process, time::Duration};
use tracing::{error, info};

/// Holocron - Catalog import runner
#[derive(Parser, Debug)]
#[command(name = "holocron-import")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging based on verbose flag and environment
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("holocron-import".to_string())
        .build();

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env_or(log_config.clone()).unwrap_or(log_config);

    // Initialize logging (ignore errors as the import should run without logging)
    let _ = init_logging(&log_config);

    if let Err(e) = run(&cli).await {
        error!(error = %e, "Import failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Run one full import against the configured database.
async fn run(cli: &Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(url) = cli.database_url.clone() {
        config.database.url = url;
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .connect(&config.database.url)
        .await?;

    info!("Database connection pool established");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    let swapi_config = SwapiConfig::from_env()?;
    run_once(&pool, &swapi_config).await?;

    info!("Import complete");

    Ok(())
}
