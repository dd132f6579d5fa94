//! Per-resource import policy

use async_trait::async_trait;
use sqlx::PgConnection;

use super::writer::BatchInsert;
use super::Result;

/// Policy for importing one remote resource.
///
/// An importer knows the remote resource name, how to prefetch the state it
/// needs for deduplication and relation resolution, and how to turn one raw
/// record into a validated row. Paging and retries live in
/// [`super::SwapiClient`]; batch commits in [`super::ChunkedWriter`]. The
/// run driver in [`super::orchestrator`] wires the three together.
#[async_trait]
pub trait ResourceImporter: Send + Sync {
    /// Row type this importer produces.
    type Entity: BatchInsert;

    /// Remote resource path segment (`films`, `starships`, `people`).
    fn resource_name(&self) -> &'static str;

    /// Load existing natural keys, and whatever lookup state relation
    /// resolution needs, into memory. Runs once per import, before any
    /// fetching.
    async fn prefetch_existing(&mut self, conn: &mut PgConnection) -> Result<()>;

    /// Validate one raw record.
    ///
    /// Returns `Ok(None)` for records that should be quietly skipped: the
    /// key field is missing, the key already exists, or validation failed
    /// (validation failures are logged here). `Err` is reserved for shapes
    /// the importer cannot interpret at all, such as relation references
    /// that are not URLs; the run driver logs and skips those records.
    fn parse(&self, raw: &serde_json::Value) -> Result<Option<Self::Entity>>;
}
