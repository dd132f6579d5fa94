//! Film importer

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgConnection;
use std::collections::HashSet;
use tracing::warn;

use super::importer::ResourceImporter;
use super::records::NewFilm;
use super::Result;

/// Imports film records, deduplicated by title.
#[derive(Debug, Default)]
pub struct FilmImporter {
    existing_titles: HashSet<String>,
}

impl FilmImporter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResourceImporter for FilmImporter {
    type Entity = NewFilm;

    fn resource_name(&self) -> &'static str {
        "films"
    }

    async fn prefetch_existing(&mut self, conn: &mut PgConnection) -> Result<()> {
        let titles: Vec<String> = sqlx::query_scalar("SELECT title FROM films")
            .fetch_all(&mut *conn)
            .await?;
        self.existing_titles = titles.into_iter().collect();
        Ok(())
    }

    fn parse(&self, raw: &Value) -> Result<Option<NewFilm>> {
        let title = match raw.get("title").and_then(Value::as_str) {
            Some(title) if !title.is_empty() => title,
            _ => return Ok(None),
        };
        if self.existing_titles.contains(title) {
            return Ok(None);
        }

        match serde_json::from_value(raw.clone()) {
            Ok(film) => Ok(Some(film)),
            Err(err) => {
                warn!("Skipping film {:?}, validation failed: {}", title, err);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_film(title: &str) -> Value {
        json!({
            "title": title,
            "episode_id": 4,
            "director": "George Lucas",
            "producer": "Gary Kurtz, Rick McCallum",
            "release_date": "1977-05-25",
        })
    }

    #[test]
    fn test_parse_valid_film() {
        let importer = FilmImporter::new();
        let film = importer.parse(&raw_film("A New Hope")).unwrap().unwrap();

        assert_eq!(film.title, "A New Hope");
        assert_eq!(film.episode_id, 4);
        assert_eq!(film.director.as_deref(), Some("George Lucas"));
    }

    #[test]
    fn test_parse_skips_existing_title() {
        let mut importer = FilmImporter::new();
        importer.existing_titles.insert("A New Hope".to_string());

        assert!(importer.parse(&raw_film("A New Hope")).unwrap().is_none());
    }

    #[test]
    fn test_parse_skips_missing_title() {
        let importer = FilmImporter::new();

        assert!(importer
            .parse(&json!({"episode_id": 4}))
            .unwrap()
            .is_none());
        assert!(importer
            .parse(&json!({"title": "", "episode_id": 4}))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_parse_skips_invalid_episode_id() {
        let importer = FilmImporter::new();
        let raw = json!({"title": "A New Hope", "episode_id": "four"});

        assert!(importer.parse(&raw).unwrap().is_none());
    }

    #[test]
    fn test_parse_accepts_missing_optional_fields() {
        let importer = FilmImporter::new();
        let raw = json!({"title": "A New Hope", "episode_id": 4});

        let film = importer.parse(&raw).unwrap().unwrap();
        assert!(film.director.is_none());
        assert!(film.producer.is_none());
        assert!(film.release_date.is_none());
    }
}
