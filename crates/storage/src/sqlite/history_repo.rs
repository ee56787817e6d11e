use lingo_core::model::{QuizRecord, UserId};

use super::SqliteRepository;
use super::mapping::{db_err, id_to_i64, map_history_row};
use crate::repository::{QuizHistoryRepository, QuizRecordId, QuizRecordRow, StorageError};

#[async_trait::async_trait]
impl QuizHistoryRepository for SqliteRepository {
    async fn append_record(&self, record: &QuizRecord) -> Result<QuizRecordId, StorageError> {
        let summary = record.summary();
        let res = sqlx::query(
            r"
            INSERT INTO quiz_history (
                user_id, category, difficulty,
                total_questions, correct, xp_earned, final_streak,
                started_at, completed_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(id_to_i64("user id", record.user_id().value())?)
        .bind(record.filter().category.as_deref())
        .bind(record.filter().difficulty.map(|d| d.as_str()))
        .bind(i64::from(summary.total_questions()))
        .bind(i64::from(summary.correct()))
        .bind(i64::from(summary.xp_earned()))
        .bind(i64::from(summary.final_streak()))
        .bind(record.started_at())
        .bind(record.completed_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(res.last_insert_rowid())
    }

    async fn get_record(&self, id: QuizRecordId) -> Result<QuizRecordRow, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, category, difficulty, total_questions, correct, xp_earned,
                   final_streak, started_at, completed_at
            FROM quiz_history WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => map_history_row(&row),
            None => Err(StorageError::NotFound),
        }
    }

    async fn list_recent(
        &self,
        user_id: UserId,
        limit: u32,
    ) -> Result<Vec<QuizRecordRow>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, category, difficulty, total_questions, correct, xp_earned,
                   final_streak, started_at, completed_at
            FROM quiz_history
            WHERE user_id = ?1
            ORDER BY completed_at DESC, id DESC
            LIMIT ?2
            ",
        )
        .bind(id_to_i64("user id", user_id.value())?)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_history_row).collect()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<QuizRecordRow>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, category, difficulty, total_questions, correct, xp_earned,
                   final_streak, started_at, completed_at
            FROM quiz_history
            WHERE user_id = ?1
            ORDER BY completed_at DESC, id DESC
            ",
        )
        .bind(id_to_i64("user id", user_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_history_row).collect()
    }
}
