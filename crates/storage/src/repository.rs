use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lingo_core::model::{
    QuizRecord, Term, TermFilter, TermId, UserId, UserProfile, normalize_username,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Storage identifier for a persisted quiz record.
///
/// `i64` to match `SQLite` row ids.
pub type QuizRecordId = i64;

/// A history record together with its row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRecordRow {
    pub id: QuizRecordId,
    pub record: QuizRecord,
}

impl QuizRecordRow {
    #[must_use]
    pub fn new(id: QuizRecordId, record: QuizRecord) -> Self {
        Self { id, record }
    }
}

/// Repository contract for the term glossary.
#[async_trait]
pub trait TermRepository: Send + Sync {
    /// Insert or replace a term by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if another term already uses the same name.
    async fn upsert_term(&self, term: &Term) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_term(&self, id: TermId) -> Result<Term, StorageError>;

    /// Terms matching `filter`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_terms(&self, filter: &TermFilter) -> Result<Vec<Term>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count_terms(&self) -> Result<u64, StorageError>;
}

/// Repository contract for learner profiles.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Create a profile under the next free id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username is taken and
    /// `StorageError::Serialization` if it is not a valid username.
    async fn create_profile(
        &self,
        username: &str,
        created_at: DateTime<Utc>,
    ) -> Result<UserProfile, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn get_profile(&self, id: UserId) -> Result<UserProfile, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn find_by_username(&self, username: &str) -> Result<Option<UserProfile>, StorageError>;

    /// Persist XP and streak of an existing profile.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the profile does not exist.
    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError>;

    /// Highest XP first, ties by username.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn top_profiles(&self, limit: u32) -> Result<Vec<UserProfile>, StorageError>;
}

/// Repository contract for completed quiz attempts.
#[async_trait]
pub trait QuizHistoryRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append_record(&self, record: &QuizRecord) -> Result<QuizRecordId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing.
    async fn get_record(&self, id: QuizRecordId) -> Result<QuizRecordRow, StorageError>;

    /// Most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_recent(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<QuizRecordRow>, StorageError>;

    /// Every record of a user, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<QuizRecordRow>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    terms: Arc<Mutex<BTreeMap<TermId, Term>>>,
    profiles: Arc<Mutex<BTreeMap<UserId, UserProfile>>>,
    history: Arc<Mutex<Vec<QuizRecordRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

fn newest_first(rows: &mut [QuizRecordRow]) {
    rows.sort_by(|a, b| {
        b.record
            .completed_at()
            .cmp(&a.record.completed_at())
            .then_with(|| b.id.cmp(&a.id))
    });
}

#[async_trait]
impl TermRepository for InMemoryRepository {
    async fn upsert_term(&self, term: &Term) -> Result<(), StorageError> {
        let mut guard = lock(&self.terms)?;
        let name_taken = guard
            .values()
            .any(|existing| existing.name() == term.name() && existing.id() != term.id());
        if name_taken {
            return Err(StorageError::Conflict);
        }
        guard.insert(term.id(), term.clone());
        Ok(())
    }

    async fn get_term(&self, id: TermId) -> Result<Term, StorageError> {
        let guard = lock(&self.terms)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_terms(&self, filter: &TermFilter) -> Result<Vec<Term>, StorageError> {
        let guard = lock(&self.terms)?;
        Ok(guard
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn count_terms(&self) -> Result<u64, StorageError> {
        let guard = lock(&self.terms)?;
        Ok(guard.len() as u64)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn create_profile(
        &self,
        username: &str,
        created_at: DateTime<Utc>,
    ) -> Result<UserProfile, StorageError> {
        let username =
            normalize_username(username).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let mut guard = lock(&self.profiles)?;
        if guard.values().any(|p| p.username() == username) {
            return Err(StorageError::Conflict);
        }
        let next = guard.keys().next_back().map_or(1, |id| id.value() + 1);
        let profile = UserProfile::new(UserId::new(next), username, created_at)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        guard.insert(profile.id(), profile.clone());
        Ok(profile)
    }

    async fn get_profile(&self, id: UserId) -> Result<UserProfile, StorageError> {
        let guard = lock(&self.profiles)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserProfile>, StorageError> {
        let wanted = username.trim();
        let guard = lock(&self.profiles)?;
        Ok(guard.values().find(|p| p.username() == wanted).cloned())
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let mut guard = lock(&self.profiles)?;
        let slot = guard.get_mut(&profile.id()).ok_or(StorageError::NotFound)?;
        *slot = profile.clone();
        Ok(())
    }

    async fn top_profiles(&self, limit: u32) -> Result<Vec<UserProfile>, StorageError> {
        let guard = lock(&self.profiles)?;
        let mut all: Vec<UserProfile> = guard.values().cloned().collect();
        all.sort_by(|a, b| {
            b.total_xp()
                .cmp(&a.total_xp())
                .then_with(|| a.username().cmp(b.username()))
        });
        all.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(all)
    }
}

#[async_trait]
impl QuizHistoryRepository for InMemoryRepository {
    async fn append_record(&self, record: &QuizRecord) -> Result<QuizRecordId, StorageError> {
        let mut guard = lock(&self.history)?;
        let id = guard.last().map_or(1, |row| row.id + 1);
        guard.push(QuizRecordRow::new(id, record.clone()));
        Ok(id)
    }

    async fn get_record(&self, id: QuizRecordId) -> Result<QuizRecordRow, StorageError> {
        let guard = lock(&self.history)?;
        guard
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_recent(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<QuizRecordRow>, StorageError> {
        let mut rows = self.list_for_user(user_id).await?;
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<QuizRecordRow>, StorageError> {
        let mut rows: Vec<QuizRecordRow> = {
            let guard = lock(&self.history)?;
            guard
                .iter()
                .filter(|row| row.record.user_id() == user_id)
                .cloned()
                .collect()
        };
        newest_first(&mut rows);
        Ok(rows)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub terms: Arc<dyn TermRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub history: Arc<dyn QuizHistoryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let terms: Arc<dyn TermRepository> = Arc::new(repo.clone());
        let profiles: Arc<dyn ProfileRepository> = Arc::new(repo.clone());
        let history: Arc<dyn QuizHistoryRepository> = Arc::new(repo);
        Self {
            terms,
            profiles,
            history,
        }
    }
}
