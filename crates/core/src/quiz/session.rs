use rand::Rng;
use serde::Serialize;

use crate::model::{Catalog, ProgressUpdate, Question, QuizSettings, QuizSummary};
use crate::quiz::error::{QuestionPhase, QuizError, QuizOperation};
use crate::quiz::generator::{ensure_catalog_size, generate_question};

//
// ─── TYPES ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// Result of submitting the selected answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub selected: String,
    pub correct_answer: String,
    pub xp_awarded: u32,
    /// Streak after this answer.
    pub streak: u32,
    /// Real-world example of the term, shown as feedback.
    pub explanation: String,
}

/// What `advance` moved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next { index: usize },
    Completed(QuizSummary),
}

/// Snapshot of where a session stands, for progress displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizProgress {
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub correct: u32,
    pub xp_earned: u32,
    pub streak: u32,
    pub status: SessionStatus,
}

/// Receives the aggregate result of a session once it completes.
pub trait ProgressSink {
    fn record(&mut self, update: ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: FnMut(ProgressUpdate),
{
    fn record(&mut self, update: ProgressUpdate) {
        self(update);
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz attempt.
///
/// Steps through its questions as select → submit → advance. Every operation checks its
/// preconditions before touching state, so a rejected call leaves the session unchanged.
#[derive(Debug, Clone)]
pub struct QuizSession {
    settings: QuizSettings,
    questions: Vec<Question>,
    current: usize,
    selected: Option<String>,
    revealed: bool,
    last_outcome: Option<AnswerOutcome>,
    score: u32,
    streak: u32,
    xp_earned: u32,
    status: SessionStatus,
}

impl QuizSession {
    /// Start a new attempt over `catalog`.
    ///
    /// Draws `question_count` distinct terms (fewer if the catalog is smaller) and builds one
    /// question per term.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::CatalogTooSmall` if the catalog cannot fill a question's options.
    pub fn start<R: Rng + ?Sized>(
        catalog: &Catalog,
        settings: &QuizSettings,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        ensure_catalog_size(catalog)?;

        let wanted = usize::try_from(settings.question_count())
            .unwrap_or(usize::MAX)
            .min(catalog.len());
        let picks = rand::seq::index::sample(rng, catalog.len(), wanted);

        let questions = picks
            .iter()
            .map(|i| generate_question(&catalog.terms()[i], catalog, rng))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            settings: *settings,
            questions,
            current: 0,
            selected: None,
            revealed: false,
            last_outcome: None,
            score: 0,
            streak: 0,
            xp_earned: 0,
            status: SessionStatus::InProgress,
        })
    }

    /// A brand-new attempt with the same settings; this session is left untouched.
    ///
    /// # Errors
    ///
    /// Same as [`QuizSession::start`].
    pub fn restart<R: Rng + ?Sized>(
        &self,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        Self::start(catalog, &self.settings, rng)
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn phase(&self) -> QuestionPhase {
        if self.status == SessionStatus::Completed {
            QuestionPhase::Completed
        } else if self.revealed {
            QuestionPhase::Revealed
        } else if self.selected.is_some() {
            QuestionPhase::AnswerSelected
        } else {
            QuestionPhase::AwaitingSelection
        }
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question being played, or `None` once completed.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.status == SessionStatus::Completed {
            return None;
        }
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Outcome of the current question once revealed.
    #[must_use]
    pub fn last_outcome(&self) -> Option<&AnswerOutcome> {
        self.last_outcome.as_ref()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn xp_earned(&self) -> u32 {
        self.xp_earned
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.questions.len();
        let answered = if self.is_complete() {
            total
        } else {
            self.current + usize::from(self.revealed)
        };
        QuizProgress {
            position: (self.current + 1).min(total),
            total,
            answered,
            correct: self.score,
            xp_earned: self.xp_earned,
            streak: self.streak,
            status: self.status,
        }
    }

    /// Choose (or change) the answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidStateTransition` once the answer is revealed or the session
    /// is completed, and `QuizError::InvalidOption` if `option` is not offered.
    pub fn select_answer(&mut self, option: &str) -> Result<(), QuizError> {
        let question = match self.phase() {
            QuestionPhase::AwaitingSelection | QuestionPhase::AnswerSelected => self
                .questions
                .get(self.current)
                .ok_or_else(|| self.rejected(QuizOperation::SelectAnswer))?,
            _ => return Err(self.rejected(QuizOperation::SelectAnswer)),
        };
        if !question.has_option(option) {
            return Err(QuizError::InvalidOption {
                option: option.to_owned(),
            });
        }
        self.selected = Some(option.to_owned());
        Ok(())
    }

    /// Reveal the result of the selected answer and score it.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidStateTransition` unless an answer is selected and not yet
    /// revealed. A second submit is rejected and never double-counts.
    pub fn submit_answer(&mut self) -> Result<AnswerOutcome, QuizError> {
        if self.phase() != QuestionPhase::AnswerSelected {
            return Err(self.rejected(QuizOperation::SubmitAnswer));
        }
        let (Some(question), Some(selected)) =
            (self.questions.get(self.current), self.selected.as_ref())
        else {
            return Err(self.rejected(QuizOperation::SubmitAnswer));
        };

        let correct = *selected == question.correct_answer;
        let (streak, xp_awarded) = if correct {
            let streak = self.streak.saturating_add(1);
            (streak, self.settings.xp_for_streak(streak))
        } else {
            (0, 0)
        };

        let outcome = AnswerOutcome {
            correct,
            selected: selected.clone(),
            correct_answer: question.correct_answer.clone(),
            xp_awarded,
            streak,
            explanation: question.real_world_example.clone(),
        };

        if correct {
            self.score = self.score.saturating_add(1);
        }
        self.streak = streak;
        self.xp_earned = self.xp_earned.saturating_add(xp_awarded);
        self.revealed = true;
        self.last_outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Move past a revealed question.
    ///
    /// On the last question this completes the session and reports the aggregate to `sink`
    /// exactly once.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidStateTransition` unless the current answer is revealed.
    pub fn advance(&mut self, sink: &mut dyn ProgressSink) -> Result<Advance, QuizError> {
        if self.phase() != QuestionPhase::Revealed {
            return Err(self.rejected(QuizOperation::Advance));
        }

        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.selected = None;
            self.revealed = false;
            self.last_outcome = None;
            return Ok(Advance::Next {
                index: self.current,
            });
        }

        self.status = SessionStatus::Completed;
        sink.record(ProgressUpdate {
            xp_earned: self.xp_earned,
            streak: self.streak,
        });
        Ok(Advance::Completed(self.build_summary()))
    }

    /// Final numbers of a completed session.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidStateTransition` while the session is still in progress.
    pub fn summary(&self) -> Result<QuizSummary, QuizError> {
        if !self.is_complete() {
            return Err(self.rejected(QuizOperation::Summary));
        }
        Ok(self.build_summary())
    }

    fn build_summary(&self) -> QuizSummary {
        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        QuizSummary::new(total, self.score, self.xp_earned, self.streak)
    }

    fn rejected(&self, operation: QuizOperation) -> QuizError {
        QuizError::InvalidStateTransition {
            operation,
            phase: self.phase(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::catalog;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn start(n: u64, seed: u64) -> QuizSession {
        let mut rng = StdRng::seed_from_u64(seed);
        QuizSession::start(&catalog(n), &QuizSettings::default(), &mut rng).unwrap()
    }

    fn wrong_option(q: &Question) -> String {
        q.options()
            .iter()
            .find(|o| *o != q.correct_answer())
            .unwrap()
            .clone()
    }

    fn answer(session: &mut QuizSession, correct: bool) -> AnswerOutcome {
        let q = session.current_question().unwrap().clone();
        let choice = if correct {
            q.correct_answer().to_owned()
        } else {
            wrong_option(&q)
        };
        session.select_answer(&choice).unwrap();
        session.submit_answer().unwrap()
    }

    fn ignore(_: ProgressUpdate) {}

    #[test]
    fn start_draws_distinct_terms() {
        let session = start(12, 9);
        assert_eq!(session.questions().len(), 5);
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(session.current_index(), 0);
        let ids: HashSet<_> = session.questions().iter().map(Question::term_id).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn question_count_clamps_to_catalog_size() {
        let session = start(4, 1);
        assert_eq!(session.questions().len(), 4);
    }

    #[test]
    fn tiny_catalog_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let err =
            QuizSession::start(&catalog(3), &QuizSettings::default(), &mut rng).unwrap_err();
        assert!(matches!(err, QuizError::CatalogTooSmall { available: 3, .. }));
    }

    #[test]
    fn scripted_run_scores_as_expected() {
        let mut session = start(12, 2024);
        let mut updates: Vec<ProgressUpdate> = Vec::new();
        let mut xp = Vec::new();

        for (i, correct) in [true, true, false, true, true].into_iter().enumerate() {
            let outcome = answer(&mut session, correct);
            xp.push(outcome.xp_awarded);
            let step = session.advance(&mut |u: ProgressUpdate| updates.push(u)).unwrap();
            if i < 4 {
                assert_eq!(step, Advance::Next { index: i + 1 });
                assert!(updates.is_empty());
            }
        }

        assert_eq!(xp, vec![10, 15, 0, 10, 15]);
        let summary = session.summary().unwrap();
        assert_eq!(summary.total_questions(), 5);
        assert_eq!(summary.correct(), 4);
        assert_eq!(summary.final_streak(), 2);
        assert_eq!(summary.xp_earned(), 50);
        assert_eq!(summary.accuracy_percent(), 80);
        assert_eq!(
            updates,
            vec![ProgressUpdate {
                xp_earned: 50,
                streak: 2
            }]
        );
    }

    #[test]
    fn streak_resets_on_miss_and_score_is_monotonic() {
        let mut session = start(12, 5);
        let mut last_score = 0;
        for correct in [true, false, true, true, false] {
            let before = session.streak();
            let outcome = answer(&mut session, correct);
            if correct {
                assert_eq!(session.streak(), before + 1);
                assert_eq!(session.score(), last_score + 1);
            } else {
                assert_eq!(session.streak(), 0);
                assert_eq!(outcome.xp_awarded, 0);
                assert_eq!(session.score(), last_score);
            }
            last_score = session.score();
            session.advance(&mut ignore).unwrap();
        }
        assert!(session.is_complete());
    }

    #[test]
    fn invalid_option_leaves_selection_unchanged() {
        let mut session = start(12, 3);
        let q = session.current_question().unwrap().clone();
        session.select_answer(&q.options()[0]).unwrap();

        let err = session.select_answer("Not An Option").unwrap_err();
        assert_eq!(
            err,
            QuizError::InvalidOption {
                option: "Not An Option".into()
            }
        );
        assert_eq!(session.selected_answer(), Some(q.options()[0].as_str()));
    }

    #[test]
    fn selection_can_change_before_submit() {
        let mut session = start(12, 3);
        let q = session.current_question().unwrap().clone();
        session.select_answer(&q.options()[0]).unwrap();
        session.select_answer(&q.options()[1]).unwrap();
        assert_eq!(session.selected_answer(), Some(q.options()[1].as_str()));
    }

    #[test]
    fn submit_without_selection_is_rejected() {
        let mut session = start(12, 4);
        let err = session.submit_answer().unwrap_err();
        assert_eq!(
            err,
            QuizError::InvalidStateTransition {
                operation: QuizOperation::SubmitAnswer,
                phase: QuestionPhase::AwaitingSelection,
            }
        );
    }

    #[test]
    fn second_submit_does_not_double_count() {
        let mut session = start(12, 6);
        answer(&mut session, true);
        let (score, streak, xp) = (session.score(), session.streak(), session.xp_earned());

        let err = session.submit_answer().unwrap_err();
        assert!(matches!(
            err,
            QuizError::InvalidStateTransition {
                phase: QuestionPhase::Revealed,
                ..
            }
        ));
        assert_eq!(
            (session.score(), session.streak(), session.xp_earned()),
            (score, streak, xp)
        );
    }

    #[test]
    fn selection_is_locked_after_reveal() {
        let mut session = start(12, 6);
        answer(&mut session, false);
        let q = session.current_question().unwrap().clone();
        let err = session.select_answer(q.correct_answer()).unwrap_err();
        assert!(matches!(err, QuizError::InvalidStateTransition { .. }));
    }

    #[test]
    fn advance_before_reveal_is_rejected() {
        let mut session = start(12, 7);
        let err = session.advance(&mut ignore).unwrap_err();
        assert!(matches!(
            err,
            QuizError::InvalidStateTransition {
                operation: QuizOperation::Advance,
                ..
            }
        ));

        let q = session.current_question().unwrap().clone();
        session.select_answer(q.correct_answer()).unwrap();
        let err = session.advance(&mut ignore).unwrap_err();
        assert_eq!(
            err,
            QuizError::InvalidStateTransition {
                operation: QuizOperation::Advance,
                phase: QuestionPhase::AnswerSelected,
            }
        );
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn advance_resets_per_question_state() {
        let mut session = start(12, 8);
        answer(&mut session, true);
        assert!(session.last_outcome().is_some());
        session.advance(&mut ignore).unwrap();
        assert_eq!(session.selected_answer(), None);
        assert!(!session.is_revealed());
        assert!(session.last_outcome().is_none());
        assert_eq!(session.phase(), QuestionPhase::AwaitingSelection);
    }

    #[test]
    fn completed_session_rejects_everything() {
        let mut session = start(4, 10);
        let mut calls = 0;
        while !session.is_complete() {
            answer(&mut session, true);
            session.advance(&mut |_: ProgressUpdate| calls += 1).unwrap();
        }
        assert_eq!(calls, 1);
        assert!(session.current_question().is_none());

        let phase = QuestionPhase::Completed;
        assert!(matches!(
            session.select_answer("Term1"),
            Err(QuizError::InvalidStateTransition { phase: p, .. }) if p == phase
        ));
        assert!(session.submit_answer().is_err());
        assert!(session.advance(&mut |_: ProgressUpdate| calls += 1).is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn summary_requires_completion() {
        let session = start(12, 11);
        assert!(matches!(
            session.summary(),
            Err(QuizError::InvalidStateTransition {
                operation: QuizOperation::Summary,
                ..
            })
        ));
    }

    #[test]
    fn progress_tracks_answered_questions() {
        let mut session = start(12, 12);
        let p = session.progress();
        assert_eq!((p.position, p.total, p.answered), (1, 5, 0));

        answer(&mut session, true);
        let p = session.progress();
        assert_eq!((p.position, p.answered, p.correct), (1, 1, 1));

        session.advance(&mut ignore).unwrap();
        let p = session.progress();
        assert_eq!((p.position, p.answered), (2, 1));
    }

    #[test]
    fn restart_produces_independent_session() {
        let mut session = start(12, 13);
        answer(&mut session, true);
        let mut rng = StdRng::seed_from_u64(99);
        let fresh = session.restart(&catalog(12), &mut rng).unwrap();

        assert_eq!(fresh.score(), 0);
        assert_eq!(fresh.xp_earned(), 0);
        assert_eq!(fresh.status(), SessionStatus::InProgress);
        assert_eq!(session.score(), 1);
        assert!(session.is_revealed());
    }

    #[test]
    fn custom_rules_apply() {
        let settings = QuizSettings::new(3, 20, 10, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let mut session = QuizSession::start(&catalog(12), &settings, &mut rng).unwrap();
        let mut awards = Vec::new();
        while !session.is_complete() {
            awards.push(answer(&mut session, true).xp_awarded);
            session.advance(&mut ignore).unwrap();
        }
        assert_eq!(awards, vec![20, 20, 30]);
    }
}
