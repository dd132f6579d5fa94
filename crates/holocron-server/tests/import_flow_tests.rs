//! End-to-end import pipeline tests
//!
//! These exercise the full fetch -> parse -> write pipeline against a
//! mocked upstream catalog. Database-backed tests require PostgreSQL
//! (set DATABASE_URL) and are marked #[ignore]; run them with:
//!
//! cargo test --test import_flow_tests -- --ignored

use std::net::SocketAddr;

use serde_json::{json, Value};
use serial_test::serial;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use holocron_server::features::{self, FeatureState};
use holocron_server::ingest::swapi::{run_all, run_once, ImportHandle, ImportLauncher, SwapiConfig};

/// Helper to create a test database pool with migrations applied
async fn create_test_pool() -> PgPool {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgresql://localhost/holocron_test".to_string());

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Helper to empty the catalog tables and reset id sequences
async fn reset_catalog(pool: &PgPool) {
    sqlx::query(
        "TRUNCATE character_films, character_starships, starship_films, \
         characters, starships, films RESTART IDENTITY CASCADE",
    )
    .execute(pool)
    .await
    .expect("Failed to reset catalog tables");
}

/// Import settings pointed at a mock catalog, with small chunks so a
/// single fixture page spans multiple transactions.
fn test_config(base_url: String) -> SwapiConfig {
    SwapiConfig {
        base_url,
        timeout_secs: 5,
        max_retries: 2,
        retryable_codes: vec![429, 500, 502, 503, 504],
        chunk_size: 2,
    }
}

fn film(title: &str, episode_id: i32) -> Value {
    json!({
        "title": title,
        "episode_id": episode_id,
        "director": "George Lucas",
        "producer": "Gary Kurtz, Rick McCallum",
        "release_date": "1977-05-25",
        "opening_crawl": "It is a period of civil war."
    })
}

fn starship(name: &str, model: &str) -> Value {
    json!({
        "name": name,
        "model": model,
        "manufacturer": "Corellian Engineering Corporation"
    })
}

fn page(results: Vec<Value>) -> Value {
    json!({
        "count": results.len(),
        "next": null,
        "previous": null,
        "results": results
    })
}

fn films_page() -> Value {
    page(vec![
        film("A New Hope", 4),
        film("The Empire Strikes Back", 5),
        film("Return of the Jedi", 6),
    ])
}

fn starships_page() -> Value {
    page(vec![
        starship("X-wing", "T-65 X-wing"),
        starship("Millennium Falcon", "YT-1300 light freighter"),
    ])
}

/// Characters referencing films and starships by catalog URL. Ids line
/// up with insertion order because the catalog tables were just reset.
fn people_page() -> Value {
    page(vec![
        json!({
            "name": "Luke Skywalker",
            "gender": "male",
            "birth_year": "19BBY",
            "films": [
                "https://swapi.dev/api/films/1/",
                "https://swapi.dev/api/films/2/"
            ],
            "starships": ["https://swapi.dev/api/starships/1/"]
        }),
        json!({
            "name": "Leia Organa",
            "gender": "female",
            "birth_year": "19BBY",
            "films": ["https://swapi.dev/api/films/1/"],
            "starships": []
        }),
        json!({
            "name": "R2-D2",
            "gender": "n/a",
            "birth_year": "33BBY",
            "films": ["https://swapi.dev/api/films/99/"],
            "starships": []
        }),
    ])
}

async fn mount_page(server: &MockServer, resource: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/", resource)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_catalog(server: &MockServer) {
    mount_page(server, "films", films_page()).await;
    mount_page(server, "starships", starships_page()).await;
    mount_page(server, "people", people_page()).await;
}

/// Serve the API router on an ephemeral port and return its address.
async fn serve_app(pool: PgPool, importer: ImportHandle) -> SocketAddr {
    let state = FeatureState { db: pool, importer };
    let app = axum::Router::new().nest("/api", features::router(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn test_import_populates_catalog() {
    let pool = create_test_pool().await;
    reset_catalog(&pool).await;

    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let config = test_config(mock_server.uri());
    run_once(&pool, &config).await.expect("Import failed");

    assert_eq!(count(&pool, "films").await, 3);
    assert_eq!(count(&pool, "starships").await, 2);
    assert_eq!(count(&pool, "characters").await, 3);

    // Luke links to two films and one starship; R2-D2's reference to an
    // unknown film id is dropped without failing the record.
    let luke_films: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM character_films cf \
         JOIN characters c ON c.id = cf.character_id \
         WHERE c.name = 'Luke Skywalker'",
    )
    .fetch_one(&pool)
    .await
    .expect("Failed to count Luke's films");
    assert_eq!(luke_films, 2);

    assert_eq!(count(&pool, "character_films").await, 3);
    assert_eq!(count(&pool, "character_starships").await, 1);
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn test_import_is_idempotent() {
    let pool = create_test_pool().await;
    reset_catalog(&pool).await;

    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let config = test_config(mock_server.uri());
    run_once(&pool, &config).await.expect("First import failed");
    run_once(&pool, &config).await.expect("Second import failed");

    assert_eq!(count(&pool, "films").await, 3);
    assert_eq!(count(&pool, "starships").await, 2);
    assert_eq!(count(&pool, "characters").await, 3);
    assert_eq!(count(&pool, "character_films").await, 3);
    assert_eq!(count(&pool, "character_starships").await, 1);
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn test_invalid_records_are_skipped() {
    let pool = create_test_pool().await;
    reset_catalog(&pool).await;

    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "films",
        page(vec![
            film("A New Hope", 4),
            json!({"director": "Unknown"}),
            json!({"title": "Bad Episode", "episode_id": "four"}),
        ]),
    )
    .await;
    mount_page(&mock_server, "starships", page(vec![])).await;
    mount_page(
        &mock_server,
        "people",
        page(vec![json!({"name": "C-3PO", "films": null})]),
    )
    .await;

    let config = test_config(mock_server.uri());
    run_once(&pool, &config).await.expect("Import failed");

    assert_eq!(count(&pool, "films").await, 1);
    assert_eq!(count(&pool, "starships").await, 0);
    assert_eq!(count(&pool, "characters").await, 0);
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn test_failed_stage_stops_later_stages() {
    let pool = create_test_pool().await;
    reset_catalog(&pool).await;

    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "films", films_page()).await;
    Mock::given(method("GET"))
        .and(path("/starships/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/people/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(people_page()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = test_config(mock_server.uri());
    run_all(&pool, &config).await;

    // Films committed before the starship stage failed; characters never ran.
    assert_eq!(count(&pool, "films").await, 3);
    assert_eq!(count(&pool, "starships").await, 0);
    assert_eq!(count(&pool, "characters").await, 0);
}

#[tokio::test]
#[serial]
#[ignore] // Requires database
async fn test_api_serves_imported_catalog() {
    let pool = create_test_pool().await;
    reset_catalog(&pool).await;

    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server).await;

    let config = test_config(mock_server.uri());
    run_once(&pool, &config).await.expect("Import failed");

    let (launcher, handle) = ImportLauncher::new(pool.clone(), config);
    let _launcher = launcher;
    let addr = serve_app(pool, handle).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("http://{}/api/films/", addr))
        .send()
        .await
        .expect("List request failed")
        .json()
        .await
        .expect("List response was not JSON");
    assert_eq!(body["count"], 3);
    assert_eq!(body["results"][0]["title"], "A New Hope");
    assert!(body["next"].is_null());

    let response = client
        .get(format!("http://{}/api/films/99", addr))
        .send()
        .await
        .expect("Detail request failed");
    assert_eq!(response.status().as_u16(), 404);

    let body: Value = client
        .get(format!("http://{}/api/characters/?name=luke", addr))
        .send()
        .await
        .expect("Filtered list request failed")
        .json()
        .await
        .expect("Filtered list response was not JSON");
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["name"], "Luke Skywalker");
    assert_eq!(body["results"][0]["films"].as_array().map(Vec::len), Some(2));
    assert_eq!(
        body["results"][0]["starships"].as_array().map(Vec::len),
        Some(1)
    );
}

#[tokio::test]
async fn test_trigger_endpoint_returns_accepted() {
    // The pool is never connected: the trigger handler only queues work.
    let pool = PgPoolOptions::new()
        .connect_lazy("postgresql://localhost/holocron_trigger_test")
        .expect("Failed to build lazy pool");

    let (launcher, handle) = ImportLauncher::new(pool.clone(), SwapiConfig::default());
    let _launcher = launcher;
    let addr = serve_app(pool, handle).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/import/", addr))
        .send()
        .await
        .expect("Trigger request failed");

    assert_eq!(response.status().as_u16(), 202);
    let body: Value = response.json().await.expect("Trigger response was not JSON");
    assert_eq!(body["detail"], "Import started in the background");
}

#[tokio::test]
async fn test_trigger_endpoint_reports_stopped_worker() {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgresql://localhost/holocron_trigger_test")
        .expect("Failed to build lazy pool");

    let (launcher, handle) = ImportLauncher::new(pool.clone(), SwapiConfig::default());
    drop(launcher);
    let addr = serve_app(pool, handle).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/import/", addr))
        .send()
        .await
        .expect("Trigger request failed");

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.expect("Trigger response was not JSON");
    assert_eq!(body["detail"], "Import worker is not running");
}
