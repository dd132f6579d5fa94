//! Import trigger route
//!
//! POST schedules a catalog import on the background worker and answers
//! immediately. The import itself runs after the response is sent, so
//! failures inside the run only show up in the logs.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use crate::ingest::swapi::ImportHandle;

pub fn imports_routes() -> Router<ImportHandle> {
    Router::new().route("/", post(trigger_import))
}

/// Schedule a catalog import run.
async fn trigger_import(State(handle): State<ImportHandle>) -> Response {
    match handle.trigger() {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(json!({"detail": "Import started in the background"})),
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Failed to schedule import run: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": err.to_string()})),
            )
                .into_response()
        }
    }
}
