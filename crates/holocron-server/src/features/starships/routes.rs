//! Starship list and detail routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::AppError;
use crate::features::shared::{ListEnvelope, PageNumber, PAGE_SIZE};
use crate::models::Starship;

pub fn starships_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(list_starships))
        .route("/:id", get(get_starship))
        .route("/:id/", get(get_starship))
}

#[derive(Debug, Deserialize)]
struct ListStarshipsQuery {
    page: Option<i64>,
    name: Option<String>,
}

/// List starships, optionally filtered by a case-insensitive name substring.
async fn list_starships(
    State(db): State<PgPool>,
    Query(query): Query<ListStarshipsQuery>,
) -> Result<Response, AppError> {
    let page = PageNumber::new(query.page).map_err(|msg| AppError::BadRequest(msg.to_string()))?;
    let name = query.name.as_deref().filter(|n| !n.is_empty());
    let pattern = name.map(|n| format!("%{}%", n));

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM starships WHERE ($1::TEXT IS NULL OR name ILIKE $1)",
    )
    .bind(pattern.as_deref())
    .fetch_one(&db)
    .await?;

    let starships: Vec<Starship> = sqlx::query_as(
        "SELECT id, name, model, manufacturer \
         FROM starships \
         WHERE ($1::TEXT IS NULL OR name ILIKE $1) \
         ORDER BY id \
         LIMIT $2 OFFSET $3",
    )
    .bind(pattern.as_deref())
    .bind(PAGE_SIZE)
    .bind(page.offset())
    .fetch_all(&db)
    .await?;

    let envelope = ListEnvelope::new(
        "/api/starships/",
        name.map(|n| ("name", n)),
        page,
        count,
        starships,
    );

    Ok((StatusCode::OK, Json(envelope)).into_response())
}

/// Fetch a single starship by id.
async fn get_starship(
    State(db): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let starship: Option<Starship> =
        sqlx::query_as("SELECT id, name, model, manufacturer FROM starships WHERE id = $1")
            .bind(id)
            .fetch_optional(&db)
            .await?;

    match starship {
        Some(starship) => Ok((StatusCode::OK, Json(starship)).into_response()),
        None => Err(AppError::NotFound(format!("Starship {} not found", id))),
    }
}
