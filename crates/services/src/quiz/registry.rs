use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use lingo_core::model::{Catalog, ProgressUpdate, SessionId, TermFilter, UserId};
use lingo_core::quiz::{QuizSession, SessionStatus};
use storage::repository::QuizRecordId;

use crate::error::QuizServiceError;

/// Where the completion result of a session stands with respect to storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Persistence {
    pub(crate) update: Option<ProgressUpdate>,
    pub(crate) completed_at: Option<DateTime<Utc>>,
    pub(crate) profile_applied: bool,
    pub(crate) history_id: Option<QuizRecordId>,
    pub(crate) in_flight: bool,
}

impl Persistence {
    /// Nothing left to write: either still playing or both steps done.
    pub(crate) fn is_settled(&self) -> bool {
        self.update.is_none() || (self.profile_applied && self.history_id.is_some())
    }
}

/// A hosted session together with what is needed to persist and restart it.
#[derive(Debug, Clone)]
pub(crate) struct ActiveSession {
    pub(crate) owner: UserId,
    pub(crate) filter: TermFilter,
    pub(crate) catalog: Catalog,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) session: QuizSession,
    pub(crate) persistence: Persistence,
}

impl ActiveSession {
    pub(crate) fn new(
        owner: UserId,
        filter: TermFilter,
        catalog: Catalog,
        started_at: DateTime<Utc>,
        session: QuizSession,
    ) -> Self {
        Self {
            owner,
            filter,
            catalog,
            started_at,
            session,
            persistence: Persistence::default(),
        }
    }
}

/// Isolated sessions keyed by id.
///
/// The lock is only held for synchronous state changes, never across storage calls.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, ActiveSession>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, ActiveSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn insert(&self, entry: ActiveSession) -> SessionId {
        let mut sessions = self.lock();
        let mut id = SessionId::random();
        while sessions.contains_key(&id) {
            id = SessionId::random();
        }
        sessions.insert(id, entry);
        id
    }

    /// Run `f` against the session `id` while holding the lock.
    pub(crate) fn with<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut ActiveSession) -> Result<T, QuizServiceError>,
    ) -> Result<T, QuizServiceError> {
        let mut sessions = self.lock();
        let entry = sessions
            .get_mut(&id)
            .ok_or(QuizServiceError::UnknownSession(id))?;
        f(entry)
    }

    pub(crate) fn remove(&self, id: SessionId) -> Result<ActiveSession, QuizServiceError> {
        self.lock()
            .remove(&id)
            .ok_or(QuizServiceError::UnknownSession(id))
    }

    /// Status of `id`; ids this registry does not hold report `NotStarted`.
    #[must_use]
    pub fn status(&self, id: SessionId) -> SessionStatus {
        self.lock()
            .get(&id)
            .map_or(SessionStatus::NotStarted, |entry| entry.session.status())
    }

    #[must_use]
    pub fn contains(&self, id: SessionId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Ids of the sessions owned by `owner`.
    #[must_use]
    pub fn sessions_of(&self, owner: UserId) -> Vec<SessionId> {
        self.lock()
            .iter()
            .filter(|(_, entry)| entry.owner == owner)
            .map(|(id, _)| *id)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_core::model::{QuizSettings, Term, TermDraft, TermId, Difficulty};
    use lingo_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn catalog() -> Catalog {
        let terms: Vec<Term> = ["API", "JWT", "Docker", "REST", "SQL"]
            .iter()
            .zip(1_u64..)
            .map(|(name, id)| {
                TermDraft {
                    name: (*name).to_owned(),
                    definition: format!("{name} definition"),
                    category: "Web Development".into(),
                    difficulty: Difficulty::Beginner,
                    code_example: None,
                    real_world_example: format!("{name} example"),
                }
                .validate(TermId::new(id), fixed_now())
                .unwrap()
            })
            .collect();
        Catalog::new(terms).unwrap()
    }

    fn entry(owner: u64) -> ActiveSession {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(5);
        let session = QuizSession::start(&catalog, &QuizSettings::default(), &mut rng).unwrap();
        ActiveSession::new(
            UserId::new(owner),
            TermFilter::all(),
            catalog,
            fixed_now(),
            session,
        )
    }

    #[test]
    fn unknown_ids_report_not_started() {
        let registry = SessionRegistry::new();
        assert_eq!(
            registry.status(SessionId::random()),
            SessionStatus::NotStarted
        );
    }

    #[test]
    fn sessions_are_isolated_per_id() {
        let registry = SessionRegistry::new();
        let a = registry.insert(entry(1));
        let b = registry.insert(entry(2));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.status(a), SessionStatus::InProgress);

        registry
            .with(a, |e| {
                let option = e.session.current_question().unwrap().correct_answer().to_owned();
                Ok(e.session.select_answer(&option)?)
            })
            .unwrap();
        let b_selected = registry
            .with(b, |e| Ok(e.session.selected_answer().map(str::to_owned)))
            .unwrap();
        assert_eq!(b_selected, None);

        assert_eq!(registry.sessions_of(UserId::new(1)), vec![a]);
        registry.remove(a).unwrap();
        assert!(!registry.contains(a));
        assert!(matches!(
            registry.remove(a).unwrap_err(),
            QuizServiceError::UnknownSession(id) if id == a
        ));
    }

    #[test]
    fn persistence_settles_after_both_steps() {
        let mut p = Persistence::default();
        assert!(p.is_settled());
        p.update = Some(ProgressUpdate {
            xp_earned: 10,
            streak: 1,
        });
        assert!(!p.is_settled());
        p.profile_applied = true;
        assert!(!p.is_settled());
        p.history_id = Some(4);
        assert!(p.is_settled());
    }
}
