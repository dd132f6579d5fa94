//! Starship importer

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgConnection;
use std::collections::HashSet;
use tracing::warn;

use super::importer::ResourceImporter;
use super::records::NewStarship;
use super::Result;

/// Imports starship records, deduplicated by name.
#[derive(Debug, Default)]
pub struct StarshipImporter {
    existing_names: HashSet<String>,
}

impl StarshipImporter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResourceImporter for StarshipImporter {
    type Entity = NewStarship;

    fn resource_name(&self) -> &'static str {
        "starships"
    }

    async fn prefetch_existing(&mut self, conn: &mut PgConnection) -> Result<()> {
        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM starships")
            .fetch_all(&mut *conn)
            .await?;
        self.existing_names = names.into_iter().collect();
        Ok(())
    }

    fn parse(&self, raw: &Value) -> Result<Option<NewStarship>> {
        let name = match raw.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => name,
            _ => return Ok(None),
        };
        if self.existing_names.contains(name) {
            return Ok(None);
        }

        match serde_json::from_value(raw.clone()) {
            Ok(starship) => Ok(Some(starship)),
            Err(err) => {
                warn!("Skipping starship {:?}, validation failed: {}", name, err);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_starship() {
        let importer = StarshipImporter::new();
        let raw = json!({
            "name": "Millennium Falcon",
            "model": "YT-1300 light freighter",
            "manufacturer": "Corellian Engineering Corporation",
            "cost_in_credits": "100000",
        });

        let starship = importer.parse(&raw).unwrap().unwrap();
        assert_eq!(starship.name, "Millennium Falcon");
        assert_eq!(starship.model.as_deref(), Some("YT-1300 light freighter"));
    }

    #[test]
    fn test_parse_skips_existing_name() {
        let mut importer = StarshipImporter::new();
        importer.existing_names.insert("Death Star".to_string());

        let raw = json!({"name": "Death Star"});
        assert!(importer.parse(&raw).unwrap().is_none());
    }

    #[test]
    fn test_parse_skips_missing_name() {
        let importer = StarshipImporter::new();

        assert!(importer.parse(&json!({"model": "DS-1"})).unwrap().is_none());
        assert!(importer.parse(&json!({"name": ""})).unwrap().is_none());
    }

    #[test]
    fn test_parse_accepts_missing_optional_fields() {
        let importer = StarshipImporter::new();

        let starship = importer.parse(&json!({"name": "X-wing"})).unwrap().unwrap();
        assert!(starship.model.is_none());
        assert!(starship.manufacturer.is_none());
    }
}
