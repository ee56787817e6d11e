//! Plain-text listings for the read-only commands.

use std::io::{self, Write};

use lingo_core::model::{CategoryCount, LeaderboardEntry, Term, UserProfile};
use services::{ProgressOverview, QuizHistoryItem};

pub fn print_terms<W: Write>(out: &mut W, terms: &[Term]) -> io::Result<()> {
    if terms.is_empty() {
        return writeln!(out, "No terms match.");
    }
    for term in terms {
        writeln!(
            out,
            "{:>3}  {:<16} {:<16} {}",
            term.id().value(),
            term.name(),
            term.category(),
            term.difficulty()
        )?;
        writeln!(out, "     {}", term.definition())?;
    }
    writeln!(out)?;
    writeln!(out, "{} term(s)", terms.len())
}

pub fn print_categories<W: Write>(out: &mut W, categories: &[CategoryCount]) -> io::Result<()> {
    for category in categories {
        writeln!(out, "{:<20} {:>3}", category.name, category.count)?;
    }
    Ok(())
}

pub fn print_progress<W: Write>(
    out: &mut W,
    profile: &UserProfile,
    overview: &ProgressOverview,
) -> io::Result<()> {
    writeln!(out, "{}", profile.username())?;
    writeln!(out, "  total XP             {}", overview.total_xp)?;
    writeln!(out, "  best streak          {}", overview.current_streak)?;
    writeln!(out, "  quizzes completed    {}", overview.sessions_completed)?;
    writeln!(
        out,
        "  terms learned        {}/{}",
        overview.terms_learned, overview.total_terms
    )?;
    writeln!(out, "  accuracy             {:.1}%", overview.accuracy_rate())?;
    if overview.categories_completed.is_empty() {
        writeln!(out, "  categories completed none yet")
    } else {
        writeln!(
            out,
            "  categories completed {}",
            overview.categories_completed.join(", ")
        )
    }
}

pub fn print_history<W: Write>(out: &mut W, items: &[QuizHistoryItem]) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "No quizzes played yet.");
    }
    for item in items {
        let scope = match (&item.category, item.difficulty) {
            (None, None) => "all terms".to_owned(),
            (Some(category), None) => category.clone(),
            (None, Some(difficulty)) => difficulty.to_string(),
            (Some(category), Some(difficulty)) => format!("{category}, {difficulty}"),
        };
        writeln!(
            out,
            "{}  {}/{} ({}%)  +{} XP  [{scope}]",
            item.completed_at.format("%Y-%m-%d %H:%M"),
            item.correct,
            item.total_questions,
            item.accuracy_percent,
            item.xp_earned
        )?;
    }
    Ok(())
}

pub fn print_leaderboard<W: Write>(out: &mut W, entries: &[LeaderboardEntry]) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(out, "Nobody has played yet.");
    }
    for entry in entries {
        writeln!(
            out,
            "{:>3}. {:<20} {:>6} XP  streak {}",
            entry.rank, entry.username, entry.total_xp, entry.current_streak
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_core::model::{Difficulty, PerformanceTier, UserId};
    use lingo_core::time::fixed_now;

    #[test]
    fn history_lines_name_their_scope() {
        let item = QuizHistoryItem {
            id: 1,
            completed_at: fixed_now(),
            category: Some("DevOps".into()),
            difficulty: Some(Difficulty::Advanced),
            total_questions: 5,
            correct: 3,
            accuracy_percent: 60,
            xp_earned: 35,
            tier: PerformanceTier::Good,
        };
        let mut out = Vec::new();
        print_history(&mut out, &[item]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.trim_end(),
            "2023-11-14 22:13  3/5 (60%)  +35 XP  [DevOps, advanced]"
        );
    }

    #[test]
    fn progress_prints_one_decimal_accuracy() {
        let profile = UserProfile::new(UserId::new(1), "DevNinja", fixed_now()).unwrap();
        let overview = ProgressOverview {
            user_id: UserId::new(1),
            total_xp: 120,
            current_streak: 4,
            sessions_completed: 3,
            terms_learned: 8,
            total_terms: 12,
            accuracy_tenths: 667,
            categories_completed: vec!["Security".into()],
        };
        let mut out = Vec::new();
        print_progress(&mut out, &profile, &overview).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("accuracy             66.7%"));
        assert!(text.contains("terms learned        8/12"));
        assert!(text.contains("categories completed Security"));
    }

    #[test]
    fn empty_leaderboard_has_a_message() {
        let mut out = Vec::new();
        print_leaderboard(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Nobody has played yet.\n");
    }
}
