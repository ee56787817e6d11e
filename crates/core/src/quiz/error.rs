use std::fmt;
use thiserror::Error;

use crate::model::TermId;

/// Operations a driver can invoke on a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizOperation {
    SelectAnswer,
    SubmitAnswer,
    Advance,
    Summary,
}

impl fmt::Display for QuizOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuizOperation::SelectAnswer => "select an answer",
            QuizOperation::SubmitAnswer => "submit an answer",
            QuizOperation::Advance => "advance",
            QuizOperation::Summary => "read the summary",
        })
    }
}

/// Where the session stands with respect to the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionPhase {
    AwaitingSelection,
    AnswerSelected,
    Revealed,
    Completed,
}

impl fmt::Display for QuestionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuestionPhase::AwaitingSelection => "no answer is selected",
            QuestionPhase::AnswerSelected => "the answer is not yet revealed",
            QuestionPhase::Revealed => "the answer is already revealed",
            QuestionPhase::Completed => "the session is completed",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("cannot {operation} while {phase}")]
    InvalidStateTransition {
        operation: QuizOperation,
        phase: QuestionPhase,
    },

    #[error("not one of the current options: {option:?}")]
    InvalidOption { option: String },

    #[error("catalog has {available} terms, at least {required} are needed")]
    CatalogTooSmall { available: usize, required: usize },

    #[error("term {0} is not part of the catalog")]
    TermNotInCatalog(TermId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_errors_read_naturally() {
        let err = QuizError::InvalidStateTransition {
            operation: QuizOperation::Advance,
            phase: QuestionPhase::AnswerSelected,
        };
        assert_eq!(
            err.to_string(),
            "cannot advance while the answer is not yet revealed"
        );
    }
}
