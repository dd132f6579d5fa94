//! Import run orchestration
//!
//! A run imports films, then starships, then characters, in that order:
//! character records reference the other two resources and only resolve
//! against rows that already exist. A failed step skips everything after
//! it.
//!
//! Runs execute on a single worker task owned by [`ImportLauncher`]. The
//! HTTP trigger pushes a message through a bounded channel and returns
//! immediately; triggers that arrive while a run is active queue up and
//! execute back to back, so at most one run touches the store at a time.

use sqlx::{PgConnection, PgPool};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::characters::CharacterImporter;
use super::client::SwapiClient;
use super::config::SwapiConfig;
use super::films::FilmImporter;
use super::importer::ResourceImporter;
use super::starships::StarshipImporter;
use super::writer::ChunkedWriter;
use super::Result;

/// Triggers waiting in the queue beyond the active run.
const IMPORT_QUEUE_CAPACITY: usize = 8;

/// Where an orchestrated run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Idle,
    ImportingFilms,
    ImportingStarships,
    ImportingCharacters,
    Done,
    Failed,
}

impl ImportPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportPhase::Idle => "idle",
            ImportPhase::ImportingFilms => "importing_films",
            ImportPhase::ImportingStarships => "importing_starships",
            ImportPhase::ImportingCharacters => "importing_characters",
            ImportPhase::Done => "done",
            ImportPhase::Failed => "failed",
        }
    }
}

/// Run the full import sequence once, propagating the first failure.
///
/// The whole run shares one pooled connection; each importer commits its
/// own chunks on it.
pub async fn run_once(pool: &PgPool, config: &SwapiConfig) -> Result<()> {
    let client = SwapiClient::new(config.clone())?;
    let writer = ChunkedWriter::new(config.chunk_size);
    let mut conn = pool.acquire().await?;

    run_importer(
        &client,
        &writer,
        &mut conn,
        FilmImporter::new(),
        ImportPhase::ImportingFilms,
    )
    .await?;
    run_importer(
        &client,
        &writer,
        &mut conn,
        StarshipImporter::new(),
        ImportPhase::ImportingStarships,
    )
    .await?;
    run_importer(
        &client,
        &writer,
        &mut conn,
        CharacterImporter::new(),
        ImportPhase::ImportingCharacters,
    )
    .await?;

    Ok(())
}

/// Run the full import sequence once, logging the outcome instead of
/// returning it. This is the worker-task entry point: a failed run must
/// never take the worker down with it.
pub async fn run_all(pool: &PgPool, config: &SwapiConfig) {
    info!("Starting catalog import run");
    match run_once(pool, config).await {
        Ok(()) => {
            info!(
                phase = ImportPhase::Done.as_str(),
                "All importers finished successfully"
            );
        }
        Err(err) => {
            error!(phase = ImportPhase::Failed.as_str(), "Importing failed: {}", err);
        }
    }
}

/// Drive one importer through prefetch, fetch, parse and write.
async fn run_importer<I>(
    client: &SwapiClient,
    writer: &ChunkedWriter,
    conn: &mut PgConnection,
    mut importer: I,
    phase: ImportPhase,
) -> Result<()>
where
    I: ResourceImporter,
{
    info!(phase = phase.as_str(), "Importing {}", importer.resource_name());

    importer.prefetch_existing(conn).await?;

    let records = client.fetch_all(importer.resource_name()).await?;

    let mut parsed = Vec::new();
    let mut invalid = 0usize;
    for raw in &records {
        match importer.parse(raw) {
            Ok(Some(record)) => parsed.push(record),
            Ok(None) => {}
            Err(err) => {
                warn!(
                    "Skipping invalid {} record: {}",
                    importer.resource_name(),
                    err
                );
                invalid += 1;
            }
        }
    }

    info!(
        "Parsed {} new {} records out of {} fetched ({} invalid)",
        parsed.len(),
        importer.resource_name(),
        records.len(),
        invalid
    );

    let written = writer.write_all(conn, &parsed).await?;
    if written > 0 {
        info!("Imported {} {} records", written, importer.resource_name());
    }

    Ok(())
}

/// Scheduling failure returned by [`ImportHandle::trigger`].
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("Import queue is full")]
    QueueFull,
    #[error("Import worker is not running")]
    WorkerStopped,
}

/// Cheap cloneable handle that schedules detached import runs.
#[derive(Debug, Clone)]
pub struct ImportHandle {
    sender: mpsc::Sender<()>,
}

impl ImportHandle {
    /// Schedule one import run without waiting for it.
    pub fn trigger(&self) -> std::result::Result<(), TriggerError> {
        self.sender.try_send(()).map_err(|err| match err {
            TrySendError::Full(_) => TriggerError::QueueFull,
            TrySendError::Closed(_) => TriggerError::WorkerStopped,
        })
    }
}

/// Owns the run queue and the resources runs need.
pub struct ImportLauncher {
    pool: PgPool,
    config: SwapiConfig,
    receiver: mpsc::Receiver<()>,
}

impl ImportLauncher {
    /// Create the launcher and the handle that feeds it.
    pub fn new(pool: PgPool, config: SwapiConfig) -> (Self, ImportHandle) {
        let (sender, receiver) = mpsc::channel(IMPORT_QUEUE_CAPACITY);
        (
            Self {
                pool,
                config,
                receiver,
            },
            ImportHandle { sender },
        )
    }

    /// Start the worker task that executes queued runs one at a time.
    pub fn start(mut self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Import worker started");
            info!(phase = ImportPhase::Idle.as_str(), "Waiting for import trigger");
            while self.receiver.recv().await.is_some() {
                run_all(&self.pool, &self.config).await;
                info!(phase = ImportPhase::Idle.as_str(), "Waiting for import trigger");
            }
            info!("Import worker stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/holocron_test")
            .unwrap()
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(ImportPhase::Idle.as_str(), "idle");
        assert_eq!(ImportPhase::ImportingFilms.as_str(), "importing_films");
        assert_eq!(ImportPhase::ImportingStarships.as_str(), "importing_starships");
        assert_eq!(
            ImportPhase::ImportingCharacters.as_str(),
            "importing_characters"
        );
        assert_eq!(ImportPhase::Done.as_str(), "done");
        assert_eq!(ImportPhase::Failed.as_str(), "failed");
    }

    #[tokio::test]
    async fn test_trigger_fails_when_queue_is_full() {
        let (_launcher, handle) = ImportLauncher::new(lazy_pool(), SwapiConfig::default());

        // The worker is not started, so nothing drains the queue
        for _ in 0..IMPORT_QUEUE_CAPACITY {
            handle.trigger().unwrap();
        }
        assert!(matches!(handle.trigger(), Err(TriggerError::QueueFull)));
    }

    #[tokio::test]
    async fn test_trigger_fails_when_worker_is_gone() {
        let (launcher, handle) = ImportLauncher::new(lazy_pool(), SwapiConfig::default());
        drop(launcher);

        assert!(matches!(handle.trigger(), Err(TriggerError::WorkerStopped)));
    }
}
