//! The quiz game loop: question generation and the per-attempt state machine.

mod error;
mod generator;
mod session;

pub use error::{QuestionPhase, QuizError, QuizOperation};
pub use generator::generate_question;
pub use session::{
    Advance, AnswerOutcome, ProgressSink, QuizProgress, QuizSession, SessionStatus,
};
