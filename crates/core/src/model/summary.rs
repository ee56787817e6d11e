use serde::Serialize;

/// How the attempt went overall, from accuracy alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PerformanceTier {
    /// 80 % or better.
    Excellent,
    /// 50 % or better.
    Good,
    KeepLearning,
}

/// Read-only outcome of a completed quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizSummary {
    total_questions: u32,
    correct: u32,
    accuracy_percent: u32,
    xp_earned: u32,
    final_streak: u32,
}

impl QuizSummary {
    /// Build a summary, deriving the accuracy.
    ///
    /// `correct` is clamped to `total_questions`.
    #[must_use]
    pub fn new(total_questions: u32, correct: u32, xp_earned: u32, final_streak: u32) -> Self {
        let correct = correct.min(total_questions);
        Self {
            total_questions,
            correct,
            accuracy_percent: accuracy_percent(correct, total_questions),
            xp_earned,
            final_streak,
        }
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        self.accuracy_percent
    }

    #[must_use]
    pub fn xp_earned(&self) -> u32 {
        self.xp_earned
    }

    #[must_use]
    pub fn final_streak(&self) -> u32 {
        self.final_streak
    }

    #[must_use]
    pub fn tier(&self) -> PerformanceTier {
        match self.accuracy_percent {
            80.. => PerformanceTier::Excellent,
            50.. => PerformanceTier::Good,
            _ => PerformanceTier::KeepLearning,
        }
    }
}

/// `round(100 * correct / total)` with halves rounded up; 0 when `total` is 0.
#[must_use]
pub fn accuracy_percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = u64::from(correct);
    let total = u64::from(total);
    let rounded = (200 * correct + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
