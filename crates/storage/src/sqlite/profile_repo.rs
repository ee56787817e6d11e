use chrono::{DateTime, Utc};
use lingo_core::model::{UserId, UserProfile, normalize_username};

use super::SqliteRepository;
use super::mapping::{db_err, id_to_i64, map_profile_row, ser};
use crate::repository::{ProfileRepository, StorageError};

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn create_profile(
        &self,
        username: &str,
        created_at: DateTime<Utc>,
    ) -> Result<UserProfile, StorageError> {
        let username = normalize_username(username).map_err(ser)?;

        let res = sqlx::query(
            r"
            INSERT INTO profiles (username, total_xp, current_streak, created_at)
            VALUES (?1, 0, 0, ?2)
            ",
        )
        .bind(&username)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let id = u64::try_from(res.last_insert_rowid()).map_err(ser)?;
        tracing::debug!(user_id = id, %username, "created profile");
        UserProfile::new(UserId::new(id), username, created_at).map_err(ser)
    }

    async fn get_profile(&self, id: UserId) -> Result<UserProfile, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, username, total_xp, current_streak, created_at
            FROM profiles WHERE id = ?1
            ",
        )
        .bind(id_to_i64("user id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => map_profile_row(&row),
            None => Err(StorageError::NotFound),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserProfile>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, username, total_xp, current_streak, created_at
            FROM profiles WHERE username = ?1
            ",
        )
        .bind(username.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_profile_row).transpose()
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE profiles
            SET total_xp = ?2, current_streak = ?3
            WHERE id = ?1
            ",
        )
        .bind(id_to_i64("user id", profile.id().value())?)
        .bind(i64::from(profile.total_xp()))
        .bind(i64::from(profile.current_streak()))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn top_profiles(&self, limit: u32) -> Result<Vec<UserProfile>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, username, total_xp, current_streak, created_at
            FROM profiles
            ORDER BY total_xp DESC, username ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_profile_row).collect()
    }
}
