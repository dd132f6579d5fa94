// SWAPI catalog import pipeline
//
// Mirrors films, starships and characters from the remote Star Wars API
// into PostgreSQL:
//
// 1. Client fetches paginated resource endpoints with per-page retries
// 2. Per-resource importers validate raw records and deduplicate against
//    natural keys prefetched from the database
// 3. The character importer resolves relation URLs against in-memory maps
//    of already-imported films and starships
// 4. A chunked writer commits parsed records in fixed-size transactions
// 5. The orchestrator runs importers in dependency order behind a single
//    worker task that the HTTP trigger feeds

pub mod characters;
pub mod client;
pub mod config;
pub mod films;
pub mod importer;
pub mod orchestrator;
pub mod records;
pub mod starships;
pub mod writer;

pub use characters::CharacterImporter;
pub use client::{PageEnvelope, SwapiClient};
pub use config::SwapiConfig;
pub use films::FilmImporter;
pub use importer::ResourceImporter;
pub use orchestrator::{run_all, run_once, ImportHandle, ImportLauncher, ImportPhase, TriggerError};
pub use starships::StarshipImporter;
pub use writer::ChunkedWriter;

/// Result type for import pipeline operations.
pub type Result<T> = std::result::Result<T, ImportError>;

/// Errors produced while mirroring the remote catalog.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the remote API
    #[error("HTTP status {status} fetching {resource} page {page}")]
    Status {
        status: u16,
        resource: String,
        page: u64,
    },

    /// Response decoded but is not a mapping with a `results` key
    #[error("Malformed payload fetching {resource} page {page}")]
    MalformedPayload { resource: String, page: u64 },

    /// Response body is not valid JSON, or `count` has the wrong shape
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A page kept failing after the configured number of attempts
    #[error("Failed to fetch {resource} page {page} after {attempts} attempts")]
    RetriesExhausted {
        resource: String,
        page: u64,
        attempts: u32,
    },

    /// A raw record had a shape the importer cannot recover from
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ImportError {
    /// Whether a later attempt could succeed where this one failed.
    ///
    /// Transport errors always qualify; status errors only when the code is
    /// in the configured retryable set. Everything else fails the page
    /// immediately.
    pub fn is_retryable(&self, retryable_codes: &[u16]) -> bool {
        match self {
            ImportError::Http(_) => true,
            ImportError::Status { status, .. } => retryable_codes.contains(status),
            _ => false,
        }
    }
}
