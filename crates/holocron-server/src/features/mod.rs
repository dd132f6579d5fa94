//! Feature modules implementing the Holocron API
//!
//! Each feature is organized as a vertical slice with its own routes
//! module, mounted under its own path prefix by [`router`].
//!
//! # Features
//!
//! - **films**: Film catalog list and detail endpoints
//! - **starships**: Starship catalog list and detail endpoints
//! - **characters**: Character endpoints with embedded film/starship relations
//! - **imports**: Trigger endpoint for background catalog imports

pub mod characters;
pub mod films;
pub mod imports;
pub mod shared;
pub mod starships;

use axum::Router;

use crate::ingest::swapi::ImportHandle;

/// Shared state for all feature routes
///
/// Contains the database connection pool for catalog reads and the handle
/// used to schedule background import runs.
#[derive(Clone)]
pub struct FeatureState {
    /// PostgreSQL connection pool for database operations
    pub db: sqlx::PgPool,
    /// Handle to the background import worker
    pub importer: ImportHandle,
}

/// Creates the main API router with all feature routes mounted
///
/// Each feature is mounted under its own path prefix:
/// - `/films` - Film catalog
/// - `/starships` - Starship catalog
/// - `/characters` - Character catalog with relations
/// - `/import` - Background import trigger
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/films", films::films_routes().with_state(state.db.clone()))
        .nest(
            "/starships",
            starships::starships_routes().with_state(state.db.clone()),
        )
        .nest(
            "/characters",
            characters::characters_routes().with_state(state.db.clone()),
        )
        .nest(
            "/import",
            imports::imports_routes().with_state(state.importer),
        )
}
