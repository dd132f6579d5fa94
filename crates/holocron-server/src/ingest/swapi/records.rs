//! Validated records produced by the importers
//!
//! These are the rows handed to the chunked writer. They deserialize from
//! the remote API's raw JSON records, ignoring the many fields the catalog
//! does not keep. Optional fields default to `None` when the remote record
//! omits them.

use serde::Deserialize;

use super::{ImportError, Result};

/// A film record ready for insertion.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFilm {
    pub title: String,
    pub episode_id: i32,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub producer: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

/// A starship record ready for insertion.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStarship {
    pub name: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
}

/// A character record ready for insertion, with its relations already
/// resolved to database ids.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCharacter {
    pub name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_year: Option<String>,
    /// Ids of already-imported films this character appears in
    #[serde(skip)]
    pub film_ids: Vec<i64>,
    /// Ids of already-imported starships this character pilots
    #[serde(skip)]
    pub starship_ids: Vec<i64>,
}

/// Extract the numeric id from a resource URL.
///
/// The remote API references related records by URL, e.g.
/// `https://swapi.dev/api/films/1/`. The id is the trailing path segment.
pub fn extract_id(url: &str) -> Result<i64> {
    let segment = url.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    segment
        .parse()
        .map_err(|_| ImportError::InvalidRecord(format!("Invalid resource URL: {}", url)))
}
