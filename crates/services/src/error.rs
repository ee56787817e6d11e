//! Shared error types for the services crate.

use thiserror::Error;

use lingo_core::model::{CatalogError, HistoryError, ProfileError, QuizSummary, SessionId};
use lingo_core::quiz::QuizError;
use storage::repository::StorageError;
use storage::seed::SeedError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogServiceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Seed(#[from] SeedError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the quiz loop.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("no active session with id {0}")]
    UnknownSession(SessionId),
    #[error("session {0} has not completed")]
    NotCompleted(SessionId),
    #[error("session {0} is still saving its result")]
    PersistenceInProgress(SessionId),
    #[error("session {0} has an unsaved result, finalize it first")]
    PersistencePending(SessionId),
    #[error("session {id} completed but its result was not saved: {source}")]
    ResultNotSaved {
        id: SessionId,
        summary: QuizSummary,
        #[source]
        source: Box<QuizServiceError>,
    },
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
