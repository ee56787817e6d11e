use thiserror::Error;

/// Number of choices shown for every question (the correct name plus three distractors).
pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("question count must be > 0")]
    InvalidQuestionCount,
}

/// Game rules for one quiz attempt.
///
/// Controls how many questions are asked and how experience points are awarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    question_count: u32,
    base_xp: u32,
    streak_bonus_xp: u32,
    streak_bonus_threshold: u32,
}

impl Default for QuizSettings {
    /// Five questions, 10 XP per correct answer, +5 XP from the second answer of a streak on.
    fn default() -> Self {
        Self {
            question_count: 5,
            base_xp: 10,
            streak_bonus_xp: 5,
            streak_bonus_threshold: 1,
        }
    }
}

impl QuizSettings {
    /// Creates custom quiz settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidQuestionCount` if `question_count` is zero.
    pub fn new(
        question_count: u32,
        base_xp: u32,
        streak_bonus_xp: u32,
        streak_bonus_threshold: u32,
    ) -> Result<Self, SettingsError> {
        if question_count == 0 {
            return Err(SettingsError::InvalidQuestionCount);
        }
        Ok(Self {
            question_count,
            base_xp,
            streak_bonus_xp,
            streak_bonus_threshold,
        })
    }

    /// Default rules with a different question count.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidQuestionCount` if `question_count` is zero.
    pub fn with_question_count(self, question_count: u32) -> Result<Self, SettingsError> {
        Self::new(
            question_count,
            self.base_xp,
            self.streak_bonus_xp,
            self.streak_bonus_threshold,
        )
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn base_xp(&self) -> u32 {
        self.base_xp
    }

    #[must_use]
    pub fn streak_bonus_xp(&self) -> u32 {
        self.streak_bonus_xp
    }

    /// The bonus applies once the streak is strictly above this value.
    #[must_use]
    pub fn streak_bonus_threshold(&self) -> u32 {
        self.streak_bonus_threshold
    }

    /// XP for a correct answer that brings the streak to `streak`.
    #[must_use]
    pub fn xp_for_streak(&self, streak: u32) -> u32 {
        if streak > self.streak_bonus_threshold {
            self.base_xp.saturating_add(self.streak_bonus_xp)
        } else {
            self.base_xp
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_game_rules() {
        let settings = QuizSettings::default();
        assert_eq!(settings.question_count(), 5);
        assert_eq!(settings.base_xp(), 10);
        assert_eq!(settings.streak_bonus_xp(), 5);
        assert_eq!(settings.streak_bonus_threshold(), 1);
    }

    #[test]
    fn bonus_starts_at_second_consecutive_answer() {
        let settings = QuizSettings::default();
        assert_eq!(settings.xp_for_streak(1), 10);
        assert_eq!(settings.xp_for_streak(2), 15);
        assert_eq!(settings.xp_for_streak(7), 15);
    }

    #[test]
    fn custom_threshold_delays_bonus() {
        let settings = QuizSettings::new(5, 20, 10, 3).unwrap();
        assert_eq!(settings.xp_for_streak(3), 20);
        assert_eq!(settings.xp_for_streak(4), 30);
    }

    #[test]
    fn rejects_zero_questions() {
        assert_eq!(
            QuizSettings::new(0, 10, 5, 1).unwrap_err(),
            SettingsError::InvalidQuestionCount
        );
        assert!(QuizSettings::default().with_question_count(0).is_err());
        assert_eq!(
            QuizSettings::default()
                .with_question_count(8)
                .unwrap()
                .question_count(),
            8
        );
    }
}
