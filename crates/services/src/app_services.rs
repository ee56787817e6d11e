use std::sync::Arc;

use lingo_core::model::QuizSettings;
use storage::repository::Storage;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::error::AppServicesError;
use crate::profile_service::ProfileService;
use crate::progress_service::ProgressService;
use crate::quiz::QuizLoopService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<CatalogService>,
    profiles: Arc<ProfileService>,
    quiz_loop: Arc<QuizLoopService>,
    progress: Arc<ProgressService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and seed an empty glossary.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or seeding fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: QuizSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, clock, settings).await
    }

    /// Build services over fresh in-memory storage, seeded with the built-in glossary.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if seeding fails.
    pub async fn in_memory(clock: Clock, settings: QuizSettings) -> Result<Self, AppServicesError> {
        Self::from_storage(Storage::in_memory(), clock, settings).await
    }

    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` if seeding the glossary fails.
    pub async fn from_storage(
        storage: Storage,
        clock: Clock,
        settings: QuizSettings,
    ) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(CatalogService::new(Arc::clone(&storage.terms)));
        catalog.ensure_seeded().await?;

        let profiles = Arc::new(ProfileService::new(clock, Arc::clone(&storage.profiles)));
        let quiz_loop = Arc::new(QuizLoopService::new(
            clock,
            settings,
            Arc::clone(&storage.terms),
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.history),
        ));
        let progress = Arc::new(ProgressService::new(
            Arc::clone(&storage.terms),
            Arc::clone(&storage.profiles),
            Arc::clone(&storage.history),
        ));

        Ok(Self {
            catalog,
            profiles,
            quiz_loop,
            progress,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn profiles(&self) -> Arc<ProfileService> {
        Arc::clone(&self.profiles)
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }
}
