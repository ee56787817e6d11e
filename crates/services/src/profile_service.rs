use std::sync::Arc;

use lingo_core::model::{UserId, UserProfile, normalize_username};
use storage::repository::{ProfileRepository, StorageError};

use crate::Clock;
use crate::error::ProfileServiceError;

/// Finds or registers learners.
#[derive(Clone)]
pub struct ProfileService {
    clock: Clock,
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(clock: Clock, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { clock, profiles }
    }

    /// Return the profile named `username`, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Profile` for an invalid username and
    /// `ProfileServiceError::Storage` if repository access fails.
    pub async fn ensure_profile(&self, username: &str) -> Result<UserProfile, ProfileServiceError> {
        let username = normalize_username(username)?;
        if let Some(existing) = self.profiles.find_by_username(&username).await? {
            return Ok(existing);
        }

        match self.profiles.create_profile(&username, self.clock.now()).await {
            Ok(profile) => {
                tracing::info!(user_id = %profile.id(), %username, "registered new learner");
                Ok(profile)
            }
            // Lost a race with a concurrent registration of the same name.
            Err(StorageError::Conflict) => self
                .profiles
                .find_by_username(&username)
                .await?
                .ok_or(ProfileServiceError::Storage(StorageError::Conflict)),
            Err(err) => Err(err.into()),
        }
    }

    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` with `StorageError::NotFound` for unknown ids.
    pub async fn get(&self, user_id: UserId) -> Result<UserProfile, ProfileServiceError> {
        Ok(self.profiles.get_profile(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_core::model::ProfileError;
    use lingo_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn service() -> ProfileService {
        ProfileService::new(Clock::fixed(fixed_now()), Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn ensure_profile_is_idempotent() {
        let service = service();
        let first = service.ensure_profile("DevNinja").await.unwrap();
        let again = service.ensure_profile("  DevNinja ").await.unwrap();
        assert_eq!(first, again);
        assert_eq!(first.total_xp(), 0);
        assert_eq!(first.created_at(), fixed_now());
        assert_eq!(service.get(first.id()).await.unwrap(), first);
    }

    #[tokio::test]
    async fn short_username_is_rejected() {
        let err = service().ensure_profile("ab").await.unwrap_err();
        assert!(matches!(
            err,
            ProfileServiceError::Profile(ProfileError::InvalidUsername { len: 2, .. })
        ));
    }
}
