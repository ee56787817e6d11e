use lingo_core::model::{
    Difficulty, QuizRecord, QuizSummary, Term, TermDraft, TermFilter, TermId, UserId, UserProfile,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{QuizRecordRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Unique-key violations become `Conflict`; everything else is a connection failure.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => StorageError::Connection(e.to_string()),
    }
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn parse_difficulty(s: &str) -> Result<Difficulty, StorageError> {
    s.parse::<Difficulty>().map_err(ser)
}

pub(crate) fn map_term_row(row: &SqliteRow) -> Result<Term, StorageError> {
    let id = TermId::new(i64_to_u64("id", row.try_get("id").map_err(ser)?)?);
    let difficulty: String = row.try_get("difficulty").map_err(ser)?;
    TermDraft {
        name: row.try_get("name").map_err(ser)?,
        definition: row.try_get("definition").map_err(ser)?,
        category: row.try_get("category").map_err(ser)?,
        difficulty: parse_difficulty(&difficulty)?,
        code_example: row.try_get("code_example").map_err(ser)?,
        real_world_example: row.try_get("real_world_example").map_err(ser)?,
    }
    .validate(id, row.try_get("created_at").map_err(ser)?)
    .map_err(ser)
}

pub(crate) fn map_profile_row(row: &SqliteRow) -> Result<UserProfile, StorageError> {
    UserProfile::from_persisted(
        UserId::new(i64_to_u64("id", row.try_get("id").map_err(ser)?)?),
        row.try_get::<String, _>("username").map_err(ser)?,
        i64_to_u32("total_xp", row.try_get("total_xp").map_err(ser)?)?,
        i64_to_u32("current_streak", row.try_get("current_streak").map_err(ser)?)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_history_row(row: &SqliteRow) -> Result<QuizRecordRow, StorageError> {
    let mut filter = TermFilter::all();
    if let Some(category) = row.try_get::<Option<String>, _>("category").map_err(ser)? {
        filter = filter.with_category(category);
    }
    if let Some(difficulty) = row.try_get::<Option<String>, _>("difficulty").map_err(ser)? {
        filter = filter.with_difficulty(parse_difficulty(&difficulty)?);
    }

    let summary = QuizSummary::new(
        i64_to_u32("total_questions", row.try_get("total_questions").map_err(ser)?)?,
        i64_to_u32("correct", row.try_get("correct").map_err(ser)?)?,
        i64_to_u32("xp_earned", row.try_get("xp_earned").map_err(ser)?)?,
        i64_to_u32("final_streak", row.try_get("final_streak").map_err(ser)?)?,
    );

    let record = QuizRecord::new(
        UserId::new(i64_to_u64("user_id", row.try_get("user_id").map_err(ser)?)?),
        filter,
        summary,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)?;

    Ok(QuizRecordRow::new(row.try_get("id").map_err(ser)?, record))
}
