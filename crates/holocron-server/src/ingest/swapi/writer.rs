//! Chunked batch persistence
//!
//! Parsed records are committed in fixed-size chunks, one transaction per
//! chunk, so a crash mid-import keeps every fully-written chunk. Films and
//! starships insert as multi-row statements; characters insert row by row
//! because each needs its generated id to write the relation link rows in
//! the same transaction.

use async_trait::async_trait;
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder, Transaction};
use tracing::{info, warn};

use super::records::{NewCharacter, NewFilm, NewStarship};
use super::Result;

/// Batch insertion for one record type.
#[async_trait]
pub trait BatchInsert: Sized + Send + Sync {
    /// Table name, used in log lines.
    fn table_name() -> &'static str;

    /// Insert one chunk inside the supplied transaction.
    async fn insert_chunk(tx: &mut Transaction<'_, Postgres>, chunk: &[Self]) -> Result<()>;
}

/// Commits records in fixed-size chunks.
pub struct ChunkedWriter {
    chunk_size: usize,
}

impl ChunkedWriter {
    /// Create a writer committing `chunk_size` records per transaction.
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Write all records, committing after every chunk.
    ///
    /// Returns the number of records written. An empty input writes
    /// nothing and logs the no-op.
    pub async fn write_all<E: BatchInsert>(
        &self,
        conn: &mut PgConnection,
        records: &[E],
    ) -> Result<usize> {
        if records.is_empty() {
            warn!("No valid {} records to insert", E::table_name());
            return Ok(0);
        }

        let total_chunks = (records.len() + self.chunk_size - 1) / self.chunk_size;
        info!(
            "Inserting {} {} records in {} chunks",
            records.len(),
            E::table_name(),
            total_chunks
        );

        let mut written = 0;
        for (chunk_idx, chunk) in records.chunks(self.chunk_size).enumerate() {
            info!(
                "Committing {} chunk {}/{} ({} records)",
                E::table_name(),
                chunk_idx + 1,
                total_chunks,
                chunk.len()
            );

            let mut tx = conn.begin().await?;
            E::insert_chunk(&mut tx, chunk).await?;
            tx.commit().await?;
            written += chunk.len();
        }

        Ok(written)
    }
}

#[async_trait]
impl BatchInsert for NewFilm {
    fn table_name() -> &'static str {
        "films"
    }

    async fn insert_chunk(tx: &mut Transaction<'_, Postgres>, chunk: &[Self]) -> Result<()> {
        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO films (title, episode_id, director, producer, release_date) ",
        );
        query_builder.push_values(chunk, |mut b, film| {
            b.push_bind(&film.title)
                .push_bind(film.episode_id)
                .push_bind(&film.director)
                .push_bind(&film.producer)
                .push_bind(&film.release_date);
        });
        query_builder.build().execute(&mut **tx).await?;
        Ok(())
    }
}

#[async_trait]
impl BatchInsert for NewStarship {
    fn table_name() -> &'static str {
        "starships"
    }

    async fn insert_chunk(tx: &mut Transaction<'_, Postgres>, chunk: &[Self]) -> Result<()> {
        let mut query_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO starships (name, model, manufacturer) ");
        query_builder.push_values(chunk, |mut b, starship| {
            b.push_bind(&starship.name)
                .push_bind(&starship.model)
                .push_bind(&starship.manufacturer);
        });
        query_builder.build().execute(&mut **tx).await?;
        Ok(())
    }
}

#[async_trait]
impl BatchInsert for NewCharacter {
    fn table_name() -> &'static str {
        "characters"
    }

    async fn insert_chunk(tx: &mut Transaction<'_, Postgres>, chunk: &[Self]) -> Result<()> {
        for character in chunk {
            let character_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO characters (name, gender, birth_year)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(&character.name)
            .bind(&character.gender)
            .bind(&character.birth_year)
            .fetch_one(&mut **tx)
            .await?;

            for &film_id in &character.film_ids {
                sqlx::query("INSERT INTO character_films (character_id, film_id) VALUES ($1, $2)")
                    .bind(character_id)
                    .bind(film_id)
                    .execute(&mut **tx)
                    .await?;
            }

            for &starship_id in &character.starship_ids {
                sqlx::query(
                    "INSERT INTO character_starships (character_id, starship_id) VALUES ($1, $2)",
                )
                .bind(character_id)
                .bind(starship_id)
                .execute(&mut **tx)
                .await?;
            }
        }
        Ok(())
    }
}
