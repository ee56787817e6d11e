use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use lingo_core::model::{
    Catalog, ProgressUpdate, Question, QuizRecord, QuizSettings, QuizSummary, SessionId,
    TermFilter, UserId,
};
use lingo_core::quiz::{Advance, AnswerOutcome, QuizProgress, QuizSession, SessionStatus};
use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::repository::{
    ProfileRepository, QuizHistoryRepository, QuizRecordId, TermRepository,
};

use super::registry::{ActiveSession, SessionRegistry};
use crate::Clock;
use crate::error::QuizServiceError;

/// Snapshot of the writes a completed session still owes storage.
#[derive(Debug, Clone)]
struct PersistJob {
    owner: UserId,
    filter: TermFilter,
    update: ProgressUpdate,
    summary: QuizSummary,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    profile_applied: bool,
    history_id: Option<QuizRecordId>,
}

/// Holds the persistence claim of a session; dropping it releases the claim, including
/// when the saving future is cancelled mid-write.
struct InFlight<'a> {
    registry: &'a SessionRegistry,
    id: SessionId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        // The session may have been discarded meanwhile; nothing to release then.
        let _ = self.registry.with(self.id, |entry| {
            entry.persistence.in_flight = false;
            Ok(())
        });
    }
}

/// Drives quiz sessions on behalf of learners and records their results.
///
/// Sessions live in a [`SessionRegistry`]. When a session completes, its progress update is
/// merged into the owner's profile and a history record is appended, each exactly once. If
/// either write fails the session stays registered and [`QuizLoopService::finalize`] retries
/// whatever is still missing.
///
/// Completed sessions stay registered so they can be restarted or finalized again;
/// callers release them with [`QuizLoopService::discard`].
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    settings: QuizSettings,
    terms: Arc<dyn TermRepository>,
    profiles: Arc<dyn ProfileRepository>,
    history: Arc<dyn QuizHistoryRepository>,
    registry: Arc<SessionRegistry>,
    rng: Arc<Mutex<StdRng>>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: QuizSettings,
        terms: Arc<dyn TermRepository>,
        profiles: Arc<dyn ProfileRepository>,
        history: Arc<dyn QuizHistoryRepository>,
    ) -> Self {
        Self {
            clock,
            settings,
            terms,
            profiles,
            history,
            registry: Arc::new(SessionRegistry::new()),
            rng: Arc::new(Mutex::new(StdRng::from_os_rng())),
        }
    }

    /// Replace the random source with a seeded one for reproducible runs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }

    /// Start a session for `user` over the terms matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if the user does not exist or terms cannot be
    /// loaded, and `QuizServiceError::Quiz` if the filtered catalog is too small.
    pub async fn start_session(
        &self,
        user: UserId,
        filter: TermFilter,
    ) -> Result<SessionId, QuizServiceError> {
        self.profiles.get_profile(user).await?;
        let catalog = Catalog::new(self.terms.list_terms(&filter).await?)?;
        let session =
            self.with_rng(|rng| QuizSession::start(&catalog, &self.settings, rng))?;
        let total = session.questions().len();

        let id = self.registry.insert(ActiveSession::new(
            user,
            filter,
            catalog,
            self.clock.now(),
            session,
        ));
        tracing::info!(session_id = %id, user_id = %user, questions = total, "quiz session started");
        Ok(id)
    }

    #[must_use]
    pub fn status(&self, id: SessionId) -> SessionStatus {
        self.registry.status(id)
    }

    /// The question awaiting an answer, or `None` once the session completed.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::UnknownSession` for ids not in the registry.
    pub fn current_question(&self, id: SessionId) -> Result<Option<Question>, QuizServiceError> {
        self.registry
            .with(id, |entry| Ok(entry.session.current_question().cloned()))
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::UnknownSession` for ids not in the registry.
    pub fn progress(&self, id: SessionId) -> Result<QuizProgress, QuizServiceError> {
        self.registry.with(id, |entry| Ok(entry.session.progress()))
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` if the option is not offered or the answer is
    /// already revealed.
    pub fn select_answer(&self, id: SessionId, option: &str) -> Result<(), QuizServiceError> {
        self.registry
            .with(id, |entry| Ok(entry.session.select_answer(option)?))
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` unless an answer is selected and not yet revealed.
    pub fn submit_answer(&self, id: SessionId) -> Result<AnswerOutcome, QuizServiceError> {
        self.registry
            .with(id, |entry| Ok(entry.session.submit_answer()?))
    }

    /// Move to the next question, or complete the session and persist its result.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` unless the current answer is revealed. If the
    /// session completes but persisting fails, `QuizServiceError::ResultNotSaved` carries
    /// the summary and the cause; the session remains available for
    /// [`QuizLoopService::finalize`].
    pub async fn advance(&self, id: SessionId) -> Result<Advance, QuizServiceError> {
        let completed_at = self.clock.now();
        let advance = self.registry.with(id, |entry| {
            let mut captured: Option<ProgressUpdate> = None;
            let advance = entry
                .session
                .advance(&mut |update: ProgressUpdate| captured = Some(update))?;
            if let Some(update) = captured {
                entry.persistence.update = Some(update);
                entry.persistence.completed_at = Some(completed_at);
            }
            Ok(advance)
        })?;

        if let Advance::Completed(summary) = advance {
            tracing::info!(
                session_id = %id,
                correct = summary.correct(),
                total = summary.total_questions(),
                xp = summary.xp_earned(),
                "quiz session completed"
            );
            if let Err(err) = self.persist(id).await {
                return Err(QuizServiceError::ResultNotSaved {
                    id,
                    summary,
                    source: Box::new(err),
                });
            }
        }
        Ok(advance)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` while the session is still in progress.
    pub fn summary(&self, id: SessionId) -> Result<QuizSummary, QuizServiceError> {
        self.registry.with(id, |entry| Ok(entry.session.summary()?))
    }

    /// Replace the session with a fresh attempt over the same catalog, keeping its id.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::PersistencePending` if a completed result has not been
    /// saved yet.
    pub fn restart(&self, id: SessionId) -> Result<(), QuizServiceError> {
        let now = self.clock.now();
        self.registry.with(id, |entry| {
            if entry.persistence.in_flight {
                return Err(QuizServiceError::PersistenceInProgress(id));
            }
            if !entry.persistence.is_settled() {
                return Err(QuizServiceError::PersistencePending(id));
            }
            let fresh = self.with_rng(|rng| entry.session.restart(&entry.catalog, rng))?;
            entry.session = fresh;
            entry.started_at = now;
            entry.persistence = Default::default();
            Ok(())
        })?;
        tracing::info!(session_id = %id, "quiz session restarted");
        Ok(())
    }

    /// Drop a session. Unsaved results are abandoned.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::UnknownSession` for ids not in the registry.
    pub fn discard(&self, id: SessionId) -> Result<(), QuizServiceError> {
        let entry = self.registry.remove(id)?;
        if !entry.persistence.is_settled() {
            tracing::warn!(session_id = %id, "discarded session with an unsaved result");
        }
        Ok(())
    }

    /// Retry any persistence step a completed session still owes.
    ///
    /// Returns the id of the history record.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NotCompleted` for sessions still in progress and the
    /// storage error of a failing write.
    pub async fn finalize(&self, id: SessionId) -> Result<QuizRecordId, QuizServiceError> {
        self.persist(id).await
    }

    async fn persist(&self, id: SessionId) -> Result<QuizRecordId, QuizServiceError> {
        let job = self.registry.with(id, |entry| {
            let p = entry.persistence;
            let (Some(update), Some(completed_at)) = (p.update, p.completed_at) else {
                return Err(QuizServiceError::NotCompleted(id));
            };
            if p.in_flight {
                return Err(QuizServiceError::PersistenceInProgress(id));
            }
            let job = PersistJob {
                owner: entry.owner,
                filter: entry.filter.clone(),
                update,
                summary: entry.session.summary()?,
                started_at: entry.started_at,
                completed_at,
                profile_applied: p.profile_applied,
                history_id: p.history_id,
            };
            entry.persistence.in_flight = true;
            Ok(job)
        })?;

        let claim = InFlight {
            registry: &self.registry,
            id,
        };
        let result = self.run_job(id, &job).await;
        drop(claim);

        if let Err(err) = &result {
            tracing::warn!(session_id = %id, error = %err, "saving quiz result failed");
        }
        result
    }

    async fn run_job(&self, id: SessionId, job: &PersistJob) -> Result<QuizRecordId, QuizServiceError> {
        if !job.profile_applied {
            let mut profile = self.profiles.get_profile(job.owner).await?;
            profile.apply_progress(job.update);
            self.profiles.save_profile(&profile).await?;
            self.registry.with(id, |entry| {
                entry.persistence.profile_applied = true;
                Ok(())
            })?;
            tracing::debug!(
                session_id = %id,
                user_id = %job.owner,
                total_xp = profile.total_xp(),
                "merged quiz progress into profile"
            );
        }

        if let Some(history_id) = job.history_id {
            return Ok(history_id);
        }

        let record = QuizRecord::new(
            job.owner,
            job.filter.clone(),
            job.summary,
            job.started_at,
            job.completed_at,
        )?;
        let history_id = self.history.append_record(&record).await?;
        self.registry.with(id, |entry| {
            entry.persistence.history_id = Some(history_id);
            Ok(())
        })?;
        tracing::debug!(session_id = %id, history_id, "appended quiz history");
        Ok(history_id)
    }
}
