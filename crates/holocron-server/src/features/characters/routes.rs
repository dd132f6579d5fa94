//! Character list and detail routes
//!
//! Character responses embed the films and starships the character is
//! linked to. The list endpoint loads those relations for the whole page
//! with two batched queries instead of one pair per character.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppError;
use crate::features::shared::{ListEnvelope, PageNumber, PAGE_SIZE};
use crate::models::{Character, FilmSummary, StarshipSummary};

pub fn characters_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(list_characters))
        .route("/:id", get(get_character))
        .route("/:id/", get(get_character))
}

/// Character with its film and starship relations embedded.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterRead {
    #[serde(flatten)]
    pub character: Character,
    pub films: Vec<FilmSummary>,
    pub starships: Vec<StarshipSummary>,
}

#[derive(Debug, Deserialize)]
struct ListCharactersQuery {
    page: Option<i64>,
    name: Option<String>,
}

/// List characters, optionally filtered by a case-insensitive name substring.
async fn list_characters(
    State(db): State<PgPool>,
    Query(query): Query<ListCharactersQuery>,
) -> Result<Response, AppError> {
    let page = PageNumber::new(query.page).map_err(|msg| AppError::BadRequest(msg.to_string()))?;
    let name = query.name.as_deref().filter(|n| !n.is_empty());
    let pattern = name.map(|n| format!("%{}%", n));

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM characters WHERE ($1::TEXT IS NULL OR name ILIKE $1)",
    )
    .bind(pattern.as_deref())
    .fetch_one(&db)
    .await?;

    let characters: Vec<Character> = sqlx::query_as(
        "SELECT id, name, gender, birth_year \
         FROM characters \
         WHERE ($1::TEXT IS NULL OR name ILIKE $1) \
         ORDER BY id \
         LIMIT $2 OFFSET $3",
    )
    .bind(pattern.as_deref())
    .bind(PAGE_SIZE)
    .bind(page.offset())
    .fetch_all(&db)
    .await?;

    let results = embed_relations(&db, characters).await?;

    let envelope = ListEnvelope::new(
        "/api/characters/",
        name.map(|n| ("name", n)),
        page,
        count,
        results,
    );

    Ok((StatusCode::OK, Json(envelope)).into_response())
}

/// Fetch a single character by id, with relations embedded.
async fn get_character(
    State(db): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let character: Option<Character> =
        sqlx::query_as("SELECT id, name, gender, birth_year FROM characters WHERE id = $1")
            .bind(id)
            .fetch_optional(&db)
            .await?;

    let character = match character {
        Some(character) => character,
        None => return Err(AppError::NotFound(format!("Character {} not found", id))),
    };

    let films: Vec<FilmSummary> = sqlx::query_as(
        "SELECT f.id, f.title, f.episode_id \
         FROM character_films cf \
         JOIN films f ON f.id = cf.film_id \
         WHERE cf.character_id = $1 \
         ORDER BY f.id",
    )
    .bind(id)
    .fetch_all(&db)
    .await?;

    let starships: Vec<StarshipSummary> = sqlx::query_as(
        "SELECT s.id, s.name, s.model \
         FROM character_starships cs \
         JOIN starships s ON s.id = cs.starship_id \
         WHERE cs.character_id = $1 \
         ORDER BY s.id",
    )
    .bind(id)
    .fetch_all(&db)
    .await?;

    let read = CharacterRead {
        character,
        films,
        starships,
    };

    Ok((StatusCode::OK, Json(read)).into_response())
}

/// Attach film and starship summaries to a page of characters.
async fn embed_relations(
    db: &PgPool,
    characters: Vec<Character>,
) -> Result<Vec<CharacterRead>, AppError> {
    if characters.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = characters.iter().map(|c| c.id).collect();

    let film_rows: Vec<(i64, i64, String, i32)> = sqlx::query_as(
        "SELECT cf.character_id, f.id, f.title, f.episode_id \
         FROM character_films cf \
         JOIN films f ON f.id = cf.film_id \
         WHERE cf.character_id = ANY($1) \
         ORDER BY f.id",
    )
    .bind(&ids)
    .fetch_all(db)
    .await?;

    let starship_rows: Vec<(i64, i64, String, Option<String>)> = sqlx::query_as(
        "SELECT cs.character_id, s.id, s.name, s.model \
         FROM character_starships cs \
         JOIN starships s ON s.id = cs.starship_id \
         WHERE cs.character_id = ANY($1) \
         ORDER BY s.id",
    )
    .bind(&ids)
    .fetch_all(db)
    .await?;

    let mut films_by_character: HashMap<i64, Vec<FilmSummary>> = HashMap::new();
    for (character_id, id, title, episode_id) in film_rows {
        films_by_character.entry(character_id).or_default().push(FilmSummary {
            id,
            title,
            episode_id,
        });
    }

    let mut starships_by_character: HashMap<i64, Vec<StarshipSummary>> = HashMap::new();
    for (character_id, id, name, model) in starship_rows {
        starships_by_character
            .entry(character_id)
            .or_default()
            .push(StarshipSummary { id, name, model });
    }

    let results = characters
        .into_iter()
        .map(|character| {
            let films = films_by_character.remove(&character.id).unwrap_or_default();
            let starships = starships_by_character
                .remove(&character.id)
                .unwrap_or_default();
            CharacterRead {
                character,
                films,
                starships,
            }
        })
        .collect();

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_characters_routes_builds() {
        let _router: Router<PgPool> = characters_routes();
    }

    #[test]
    fn test_character_read_flattens_fields() {
        let read = CharacterRead {
            character: Character {
                id: 1,
                name: "Luke Skywalker".to_string(),
                gender: Some("male".to_string()),
                birth_year: Some("19BBY".to_string()),
            },
            films: vec![FilmSummary {
                id: 1,
                title: "A New Hope".to_string(),
                episode_id: 4,
            }],
            starships: vec![],
        };

        let value = serde_json::to_value(&read).unwrap();
        assert_eq!(value["name"], "Luke Skywalker");
        assert_eq!(value["films"][0]["title"], "A New Hope");
        assert_eq!(value["starships"].as_array().unwrap().len(), 0);
    }
}
