//! Film list and detail routes

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
use crate::models::Film;

pub fn films_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(list_films))
        .route("/:id", get(get_film))
        .route("/:id/", get(get_film))
}

#[derive(Debug, Deserialize)]
struct ListFilmsQuery {
    page: Option<i64>,
    title: Option<String>,
}

/// List films, optionally filtered by a case-insensitive title substring.
async fn list_films(
    State(db): State<PgPool>,
    Query(query): Query<ListFilmsQuery>,
) -> Result<Response, AppError> {
    let page = PageNumber::new(query.page).map_err(|msg| AppError::BadRequest(msg.to_string()))?;
    let title = query.title.as_deref().filter(|t| !t.is_empty());
    let pattern = title.map(|t| format!("%{}%", t));

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM films WHERE ($1::TEXT IS NULL OR title ILIKE $1)")
            .bind(pattern.as_deref())
            .fetch_one(&db)
            .await?;

    let films: Vec<Film> = sqlx::query_as(
        "SELECT id, title, episode_id, director, producer, release_date \
         FROM films \
         WHERE ($1::TEXT IS NULL OR title ILIKE $1) \
         ORDER BY id \
         LIMIT $2 OFFSET $3",
    )
    .bind(pattern.as_deref())
    .bind(PAGE_SIZE)
    .bind(page.offset())
    .fetch_all(&db)
    .await?;

    let envelope = ListEnvelope::new(
        "/api/films/",
        title.map(|t| ("title", t)),
        page,
        count,
        films,
    );

    Ok((StatusCode::OK, Json(envelope)).into_response())
}

/// Fetch a single film by id.
async fn get_film(
    State(db): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let film: Option<Film> = sqlx::query_as(
        "SELECT id, title, episode_id, director, producer, release_date FROM films WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&db)
    .await?;

    match film {
        Some(film) => Ok((StatusCode::OK, Json(film)).into_response()),
        None => Err(AppError::NotFound(format!("Film {} not found", id))),
    }
}
