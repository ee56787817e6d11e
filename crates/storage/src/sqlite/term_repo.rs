use lingo_core::model::{Term, TermFilter, TermId};

use super::SqliteRepository;
use super::mapping::{db_err, id_to_i64, map_term_row, ser};
use crate::repository::{StorageError, TermRepository};

#[async_trait::async_trait]
impl TermRepository for SqliteRepository {
    async fn upsert_term(&self, term: &Term) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO terms (id, name, definition, category, difficulty, code_example, real_world_example, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                definition = excluded.definition,
                category = excluded.category,
                difficulty = excluded.difficulty,
                code_example = excluded.code_example,
                real_world_example = excluded.real_world_example
            ",
        )
        .bind(id_to_i64("term id", term.id().value())?)
        .bind(term.name())
        .bind(term.definition())
        .bind(term.category())
        .bind(term.difficulty().as_str())
        .bind(term.code_example())
        .bind(term.real_world_example())
        .bind(term.created_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_term(&self, id: TermId) -> Result<Term, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, definition, category, difficulty, code_example, real_world_example, created_at
            FROM terms WHERE id = ?1
            ",
        )
        .bind(id_to_i64("term id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => map_term_row(&row),
            None => Err(StorageError::NotFound),
        }
    }

    async fn list_terms(&self, filter: &TermFilter) -> Result<Vec<Term>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, definition, category, difficulty, code_example, real_world_example, created_at
            FROM terms
            WHERE (?1 IS NULL OR category = ?1)
              AND (?2 IS NULL OR difficulty = ?2)
            ORDER BY id ASC
            ",
        )
        .bind(filter.category.as_deref())
        .bind(filter.difficulty.map(|d| d.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_term_row).collect()
    }

    async fn count_terms(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM terms")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        u64::try_from(count).map_err(ser)
    }
}
