//! Interactive terminal quiz.

use std::io::{self, BufRead, Write};

use lingo_core::model::{PerformanceTier, Question, QuizSummary, SessionId, TermFilter, UserId};
use lingo_core::quiz::{Advance, AnswerOutcome, QuizProgress};
use services::{QuizLoopService, QuizServiceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Quiz(#[from] QuizServiceError),
}

enum Input {
    Pick(usize),
    Hint,
    Quit,
    Invalid,
}

fn parse_input(line: &str, options: usize) -> Input {
    match line.trim() {
        "h" | "H" | "hint" => Input::Hint,
        "q" | "Q" | "quit" => Input::Quit,
        raw => match raw.parse::<usize>() {
            Ok(n) if (1..=options).contains(&n) => Input::Pick(n - 1),
            _ => Input::Invalid,
        },
    }
}

/// Play one session to the end and release it from the registry.
///
/// Returns `None` if the player quit or input ended early; nothing is recorded then.
///
/// # Errors
///
/// Returns `PlayError` on terminal I/O failures and on quiz errors, including a result that
/// could not be saved even after one retry.
pub async fn run_quiz<R: BufRead, W: Write>(
    quiz: &QuizLoopService,
    user: UserId,
    filter: TermFilter,
    input: &mut R,
    out: &mut W,
) -> Result<Option<QuizSummary>, PlayError> {
    let id = quiz.start_session(user, filter).await?;

    loop {
        let Some(question) = quiz.current_question(id)? else {
            return Ok(Some(quiz.summary(id)?));
        };
        print_question(out, &quiz.progress(id)?, &question)?;

        let Some(choice) = prompt_choice(out, input, &question)? else {
            quiz.discard(id)?;
            writeln!(out, "Quiz abandoned.")?;
            return Ok(None);
        };

        quiz.select_answer(id, &question.options()[choice])?;
        let outcome = quiz.submit_answer(id)?;
        print_outcome(out, &outcome)?;

        match advance(quiz, id).await? {
            Advance::Next { .. } => writeln!(out)?,
            Advance::Completed(summary) => {
                quiz.discard(id)?;
                print_summary(out, &summary)?;
                return Ok(Some(summary));
            }
        }
    }
}

async fn advance(quiz: &QuizLoopService, id: SessionId) -> Result<Advance, PlayError> {
    match quiz.advance(id).await {
        Ok(advance) => Ok(advance),
        Err(QuizServiceError::ResultNotSaved { summary, source, .. }) => {
            tracing::warn!(session_id = %id, error = %source, "retrying save of quiz result");
            quiz.finalize(id).await?;
            Ok(Advance::Completed(summary))
        }
        Err(err) => Err(err.into()),
    }
}

/// Read until the player picks an option; `None` means quit or end of input.
fn prompt_choice<R: BufRead, W: Write>(
    out: &mut W,
    input: &mut R,
    question: &Question,
) -> Result<Option<usize>, PlayError> {
    let options = question.options().len();
    loop {
        write!(out, "Your answer (1-{options}, h for hint, q to quit): ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(None);
        }
        match parse_input(&line, options) {
            Input::Pick(index) => return Ok(Some(index)),
            Input::Hint => writeln!(out, "Hint: {}", question.hint())?,
            Input::Quit => return Ok(None),
            Input::Invalid => writeln!(out, "Please enter a number between 1 and {options}.")?,
        }
    }
}

fn print_question<W: Write>(
    out: &mut W,
    progress: &QuizProgress,
    question: &Question,
) -> io::Result<()> {
    writeln!(
        out,
        "Question {}/{} | score {}/{} | streak {} | {} XP",
        progress.position,
        progress.total,
        progress.correct,
        progress.answered,
        progress.streak,
        progress.xp_earned
    )?;
    writeln!(out, "[{} · {}]", question.category(), question.difficulty())?;
    writeln!(out)?;
    writeln!(out, "{}", question.definition())?;
    if let Some(code) = question.code_example() {
        writeln!(out)?;
        for line in code.lines() {
            writeln!(out, "    {line}")?;
        }
    }
    writeln!(out)?;
    for (i, option) in question.options().iter().enumerate() {
        writeln!(out, "  {}) {option}", i + 1)?;
    }
    Ok(())
}

fn print_outcome<W: Write>(out: &mut W, outcome: &AnswerOutcome) -> io::Result<()> {
    if outcome.correct {
        writeln!(
            out,
            "Correct! +{} XP (streak {})",
            outcome.xp_awarded, outcome.streak
        )?;
    } else {
        writeln!(out, "Not quite. The answer was {}.", outcome.correct_answer)?;
    }
    writeln!(out, "{}", outcome.explanation)
}

fn tier_message(tier: PerformanceTier) -> &'static str {
    match tier {
        PerformanceTier::Excellent => "Amazing!",
        PerformanceTier::Good => "Good Job!",
        PerformanceTier::KeepLearning => "Keep Learning!",
    }
}

pub fn print_summary<W: Write>(out: &mut W, summary: &QuizSummary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", tier_message(summary.tier()))?;
    writeln!(
        out,
        "{}/{} correct ({}%), {} XP earned, final streak {}",
        summary.correct(),
        summary.total_questions(),
        summary.accuracy_percent(),
        summary.xp_earned(),
        summary.final_streak()
    )
}
