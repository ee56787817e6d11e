use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::catalog::TermFilter;
use crate::model::ids::UserId;
use crate::model::summary::QuizSummary;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HistoryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,
}

/// A finished quiz attempt as kept in a user's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRecord {
    user_id: UserId,
    filter: TermFilter,
    summary: QuizSummary,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
}

impl QuizRecord {
    /// # Errors
    ///
    /// Returns `HistoryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    pub fn new(
        user_id: UserId,
        filter: TermFilter,
        summary: QuizSummary,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, HistoryError> {
        if completed_at < started_at {
            return Err(HistoryError::InvalidTimeRange);
        }
        Ok(Self {
            user_id,
            filter,
            summary,
            started_at,
            completed_at,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Catalog restriction the attempt was played with.
    #[must_use]
    pub fn filter(&self) -> &TermFilter {
        &self.filter
    }

    #[must_use]
    pub fn summary(&self) -> &QuizSummary {
        &self.summary
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn rejects_inverted_time_range() {
        let now = fixed_now();
        let err = QuizRecord::new(
            UserId::new(1),
            TermFilter::all(),
            QuizSummary::new(5, 3, 30, 1),
            now,
            now - chrono::Duration::seconds(1),
        )
        .unwrap_err();
        assert_eq!(err, HistoryError::InvalidTimeRange);
    }

    #[test]
    fn keeps_filter_and_summary() {
        let now = fixed_now();
        let record = QuizRecord::new(
            UserId::new(2),
            TermFilter::all().with_category("DevOps"),
            QuizSummary::new(5, 5, 70, 5),
            now,
            now + chrono::Duration::minutes(3),
        )
        .unwrap();
        assert_eq!(record.filter().category.as_deref(), Some("DevOps"));
        assert_eq!(record.summary().accuracy_percent(), 100);
    }
}
