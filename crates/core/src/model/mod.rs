mod catalog;
mod history;
mod ids;
mod profile;
mod question;
mod settings;
mod summary;
mod term;

pub use ids::{ParseIdError, SessionId, TermId, UserId};

pub use catalog::{Catalog, CatalogError, CategoryCount, TermFilter};
pub use history::{HistoryError, QuizRecord};
pub use profile::{
    LeaderboardEntry, ProfileError, ProgressUpdate, UserProfile, normalize_username,
    rank_leaderboard,
};
pub use question::Question;
pub use settings::{OPTIONS_PER_QUESTION, QuizSettings, SettingsError};
pub use summary::{PerformanceTier, QuizSummary, accuracy_percent};
pub use term::{Difficulty, Term, TermDraft, TermError};

#[cfg(test)]
pub(crate) use catalog::fixtures;
