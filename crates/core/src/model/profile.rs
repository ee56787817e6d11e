use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::UserId;

const MIN_USERNAME_CHARS: usize = 3;
const MAX_USERNAME_CHARS: usize = 50;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("username must be between {min} and {max} characters, got {len}")]
    InvalidUsername { len: usize, min: usize, max: usize },
}

/// Aggregate a completed session reports back to its owner's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    pub xp_earned: u32,
    pub streak: u32,
}

/// A learner's running totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    id: UserId,
    username: String,
    total_xp: u32,
    current_streak: u32,
    created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Creates a fresh profile with zero XP.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::InvalidUsername` if the trimmed name is outside 3..=50 chars.
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ProfileError> {
        Self::from_persisted(id, username, 0, 0, created_at)
    }

    /// Rehydrate a profile from storage.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::InvalidUsername` if the stored name is invalid.
    pub fn from_persisted(
        id: UserId,
        username: impl Into<String>,
        total_xp: u32,
        current_streak: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ProfileError> {
        let username = normalize_username(&username.into())?;
        Ok(Self {
            id,
            username,
            total_xp,
            current_streak,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn total_xp(&self) -> u32 {
        self.total_xp
    }

    #[must_use]
    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Merge a session result: XP accumulates, the streak keeps its best value.
    pub fn apply_progress(&mut self, update: ProgressUpdate) {
        self.total_xp = self.total_xp.saturating_add(update.xp_earned);
        self.current_streak = self.current_streak.max(update.streak);
    }
}

/// Trim and length-check a username.
///
/// # Errors
///
/// Returns `ProfileError::InvalidUsername` when out of bounds.
pub fn normalize_username(raw: &str) -> Result<String, ProfileError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if !(MIN_USERNAME_CHARS..=MAX_USERNAME_CHARS).contains(&len) {
        return Err(ProfileError::InvalidUsername {
            len,
            min: MIN_USERNAME_CHARS,
            max: MAX_USERNAME_CHARS,
        });
    }
    Ok(trimmed.to_owned())
}

//
// ─── LEADERBOARD ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub username: String,
    pub total_xp: u32,
    pub current_streak: u32,
}

/// Rank profiles by XP (highest first, ties by username) and keep the top `limit`.
#[must_use]
pub fn rank_leaderboard(profiles: &[UserProfile], limit: usize) -> Vec<LeaderboardEntry> {
    let mut sorted: Vec<&UserProfile> = profiles.iter().collect();
    sorted.sort_by(|a, b| {
        b.total_xp
            .cmp(&a.total_xp)
            .then_with(|| a.username.cmp(&b.username))
    });

    sorted
        .into_iter()
        .take(limit)
        .zip(1_u32..)
        .map(|(profile, rank)| LeaderboardEntry {
            rank,
            username: profile.username.clone(),
            total_xp: profile.total_xp,
            current_streak: profile.current_streak,
        })
        .collect()
}
