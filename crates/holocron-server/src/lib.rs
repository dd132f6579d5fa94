//! Holocron Server Library
//!
//! HTTP server mirroring a public Star Wars catalog into PostgreSQL.
//!
//! # Overview
//!
//! The Holocron server exposes a REST API over a locally mirrored catalog:
//!
//! - **Catalog Endpoints**: Paginated, filterable film/starship/character reads
//! - **Import Pipeline**: Background ingestion from the upstream catalog API
//! - **Database Management**: PostgreSQL integration with SQLx
//! - **Configuration**: Environment-based configuration management
//! - **Middleware**: CORS, request logging, and response compression
//!
//! # Architecture
//!
//! Reads and ingestion are split into separate module trees:
//!
//! - [`features`] holds the HTTP API, one vertical slice per resource,
//!   mounted under `/api` by the binary.
//! - [`ingest`] holds the import pipeline that fetches the upstream
//!   catalog, deduplicates against existing rows, resolves relation
//!   references and writes in chunked transactions. A run is triggered
//!   over HTTP (`POST /api/import/`) and executes on a background worker.
//!
//! ## Framework Stack
//!
//! - **Axum**: Web framework for the API surface
//! - **SQLx**: Runtime-checked SQL queries against PostgreSQL
//! - **Reqwest**: HTTP client for upstream catalog fetches
//!
//! # Example
//!
//! ```no_run
//! use holocron_server::ingest::swapi::{run_once, SwapiConfig};
//! use sqlx::postgres::PgPoolOptions;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = PgPoolOptions::new().connect("postgres://localhost/holocron").await?;
//!     let config = SwapiConfig::from_env()?;
//!     run_once(&pool, &config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;
pub mod models;

// Re-export commonly used types
pub use error::AppError;
