//! Database models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Film model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Film {
    pub id: i64,
    pub title: String,
    pub episode_id: i32,
    pub director: Option<String>,
    pub producer: Option<String>,
    pub release_date: Option<String>,
}

/// Starship model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Starship {
    pub id: i64,
    pub name: String,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
}

/// Character model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub gender: Option<String>,
    pub birth_year: Option<String>,
}

/// Film fields embedded in character responses
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FilmSummary {
    pub id: i64,
    pub title: String,
    pub episode_id: i32,
}

/// Starship fields embedded in character responses
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StarshipSummary {
    pub id: i64,
    pub name: String,
    pub model: Option<String>,
}
