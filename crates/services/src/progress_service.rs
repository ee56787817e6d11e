use std::sync::Arc;

use chrono::{DateTime, Utc};
use lingo_core::model::{
    Difficulty, LeaderboardEntry, PerformanceTier, TermFilter, UserId, rank_leaderboard,
};
use serde::Serialize;
use storage::repository::{
    ProfileRepository, QuizHistoryRepository, QuizRecordId, QuizRecordRow, TermRepository,
};

use crate::error::ProgressServiceError;

pub const DEFAULT_HISTORY_LIMIT: u32 = 20;
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;

/// Aggregate learning stats of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressOverview {
    pub user_id: UserId,
    pub total_xp: u32,
    pub current_streak: u32,
    pub sessions_completed: u32,
    pub terms_learned: u64,
    pub total_terms: u64,
    /// Accuracy in tenths of a percent (`755` is 75.5 %).
    pub accuracy_tenths: u32,
    pub categories_completed: Vec<String>,
}

impl ProgressOverview {
    /// Accuracy in percent, one decimal.
    #[must_use]
    pub fn accuracy_rate(&self) -> f64 {
        f64::from(self.accuracy_tenths) / 10.0
    }
}

/// Presentation-agnostic history line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizHistoryItem {
    pub id: QuizRecordId,
    pub completed_at: DateTime<Utc>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub total_questions: u32,
    pub correct: u32,
    pub accuracy_percent: u32,
    pub xp_earned: u32,
    pub tier: PerformanceTier,
}

impl QuizHistoryItem {
    #[must_use]
    pub fn from_row(row: &QuizRecordRow) -> Self {
        let summary = row.record.summary();
        let filter = row.record.filter();
        Self {
            id: row.id,
            completed_at: row.record.completed_at(),
            category: filter.category.clone(),
            difficulty: filter.difficulty,
            total_questions: summary.total_questions(),
            correct: summary.correct(),
            accuracy_percent: summary.accuracy_percent(),
            xp_earned: summary.xp_earned(),
            tier: summary.tier(),
        }
    }
}

/// `round(1000 * correct / total)` with halves rounded up; 0 when nothing was answered.
fn accuracy_tenths(correct: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    u32::try_from((2000 * correct + total) / (2 * total)).unwrap_or(u32::MAX)
}

/// Read-side views over profiles, history and the glossary.
#[derive(Clone)]
pub struct ProgressService {
    terms: Arc<dyn TermRepository>,
    profiles: Arc<dyn ProfileRepository>,
    history: Arc<dyn QuizHistoryRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        terms: Arc<dyn TermRepository>,
        profiles: Arc<dyn ProfileRepository>,
        history: Arc<dyn QuizHistoryRepository>,
    ) -> Self {
        Self {
            terms,
            profiles,
            history,
        }
    }

    /// Stats across every completed session of `user_id`.
    ///
    /// A category counts as completed once the user's total correct answers reach 80 % of
    /// its term count.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the user does not exist or storage fails.
    pub async fn overview(&self, user_id: UserId) -> Result<ProgressOverview, ProgressServiceError> {
        let profile = self.profiles.get_profile(user_id).await?;
        let rows = self.history.list_for_user(user_id).await?;
        let terms = self.terms.list_terms(&TermFilter::all()).await?;
        let total_terms = terms.len() as u64;

        let (total_correct, total_questions) = rows.iter().fold((0_u64, 0_u64), |(c, t), row| {
            let summary = row.record.summary();
            (
                c + u64::from(summary.correct()),
                t + u64::from(summary.total_questions()),
            )
        });

        let mut categories: Vec<(String, u64)> = Vec::new();
        for term in &terms {
            match categories.iter_mut().find(|(name, _)| name.as_str() == term.category()) {
                Some((_, count)) => *count += 1,
                None => categories.push((term.category().to_owned(), 1)),
            }
        }
        let categories_completed = categories
            .into_iter()
            .filter(|(_, count)| count * 4 <= total_correct * 5)
            .map(|(name, _)| name)
            .collect();

        Ok(ProgressOverview {
            user_id,
            total_xp: profile.total_xp(),
            current_streak: profile.current_streak(),
            sessions_completed: u32::try_from(rows.len()).unwrap_or(u32::MAX),
            terms_learned: total_correct.min(total_terms),
            total_terms,
            accuracy_tenths: accuracy_tenths(total_correct, total_questions),
            categories_completed,
        })
    }

    /// Most recent sessions first; `None` uses the default limit of 20.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn history(
        &self,
        user_id: UserId,
        limit: Option<u32>,
    ) -> Result<Vec<QuizHistoryItem>, ProgressServiceError> {
        let rows = self
            .history
            .list_recent(user_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .await?;
        Ok(rows.iter().map(QuizHistoryItem::from_row).collect())
    }

    /// Top learners by XP; `None` uses the default limit of 10.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn leaderboard(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<LeaderboardEntry>, ProgressServiceError> {
        let limit = limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
        let profiles = self.profiles.top_profiles(limit).await?;
        Ok(rank_leaderboard(
            &profiles,
            usize::try_from(limit).unwrap_or(usize::MAX),
        ))
    }
}
