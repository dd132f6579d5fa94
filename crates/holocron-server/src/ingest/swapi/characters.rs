//! Character importer
//!
//! Characters are imported last: their records reference films and
//! starships by URL, and those references only resolve against rows the
//! earlier importers have already written.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgConnection;
use std::collections::{HashMap, HashSet};
use tracing::warn;

use super::importer::ResourceImporter;
use super::records::{extract_id, NewCharacter};
use super::{ImportError, Result};

/// Imports character records, deduplicated by name, resolving film and
/// starship references against prefetched id maps.
#[derive(Debug, Default)]
pub struct CharacterImporter {
    existing_names: HashSet<String>,
    film_map: HashMap<i64, String>,
    starship_map: HashMap<i64, String>,
}

impl CharacterImporter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResourceImporter for CharacterImporter {
    type Entity = NewCharacter;

    fn resource_name(&self) -> &'static str {
        "people"
    }

    async fn prefetch_existing(&mut self, conn: &mut PgConnection) -> Result<()> {
        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM characters")
            .fetch_all(&mut *conn)
            .await?;
        self.existing_names = names.into_iter().collect();

        let films: Vec<(i64, String)> = sqlx::query_as("SELECT id, title FROM films")
            .fetch_all(&mut *conn)
            .await?;
        self.film_map = films.into_iter().collect();

        let starships: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM starships")
            .fetch_all(&mut *conn)
            .await?;
        self.starship_map = starships.into_iter().collect();

        Ok(())
    }

    fn parse(&self, raw: &Value) -> Result<Option<NewCharacter>> {
        let name = match raw.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => name,
            _ => return Ok(None),
        };
        if self.existing_names.contains(name) {
            return Ok(None);
        }

        let mut character: NewCharacter = match serde_json::from_value(raw.clone()) {
            Ok(character) => character,
            Err(err) => {
                warn!("Skipping character {:?}, validation failed: {}", name, err);
                return Ok(None);
            }
        };

        character.film_ids = resolve_references(raw.get("films"), &self.film_map)?;
        character.starship_ids = resolve_references(raw.get("starships"), &self.starship_map)?;

        Ok(Some(character))
    }
}

/// Resolve a list of resource URLs to the ids present in `known`.
///
/// References to ids the catalog has not imported are dropped without
/// comment. A reference that cannot be read as a resource URL at all is an
/// error and invalidates the whole record.
fn resolve_references(refs: Option<&Value>, known: &HashMap<i64, String>) -> Result<Vec<i64>> {
    let urls = match refs {
        None => return Ok(Vec::new()),
        Some(value) => value.as_array().ok_or_else(|| {
            ImportError::InvalidRecord(format!("Relation list is not an array: {}", value))
        })?,
    };

    let mut ids = Vec::new();
    for url in urls {
        let url = url.as_str().ok_or_else(|| {
            ImportError::InvalidRecord(format!("Relation reference is not a string: {}", url))
        })?;
        let id = extract_id(url)?;
        if known.contains_key(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}
