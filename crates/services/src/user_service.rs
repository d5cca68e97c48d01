use std::sync::Arc;

use kard_core::model::{UserId, UserRecord};
use storage::repository::UserRepository;

use crate::Clock;
use crate::error::UserServiceError;

/// Maintains the mirrored user records that back the sign-in and sign-up
/// endpoints.
#[derive(Clone)]
pub struct UserService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
}

impl UserService {
    #[must_use]
    pub fn new(clock: Clock, users: Arc<dyn UserRepository>) -> Self {
        Self { clock, users }
    }

    /// Create the mirror record for a new account, with an empty profile.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if the record cannot be created.
    pub async fn mirror_sign_up(
        &self,
        id: UserId,
        email: &str,
    ) -> Result<UserRecord, UserServiceError> {
        let user = UserRecord::new(id, email.trim(), self.clock.now());
        self.users
            .create_user(&user)
            .await
            .inspect_err(|e| tracing::error!(user_id = %id, error = %e, "error creating user"))?;
        Ok(user)
    }

    /// Stamp the last-login time.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::NotFound` for an unknown id, or
    /// `UserServiceError::Storage` if the update fails.
    pub async fn record_sign_in(&self, id: UserId) -> Result<UserRecord, UserServiceError> {
        let user = self
            .users
            .record_login(id, self.clock.now())
            .await
            .inspect_err(|e| tracing::error!(user_id = %id, error = %e, "error updating user"))?;
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if the lookup fails.
    pub async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>, UserServiceError> {
        Ok(self.users.get_user(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kard_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn sign_up_then_sign_in_stamps_last_login() {
        let service = UserService::new(Clock::fixed(fixed_now()), Arc::new(InMemoryRepository::new()));
        let id = UserId::generate();
        let created = service.mirror_sign_up(id, " ana@example.com ").await.unwrap();
        assert_eq!(created.email, "ana@example.com");
        assert!(created.last_login.is_none());
        assert_eq!(created.profile, Default::default());

        let signed_in = service.record_sign_in(id).await.unwrap();
        assert_eq!(signed_in.last_login, Some(fixed_now()));
    }

    #[tokio::test]
    async fn sign_in_for_unknown_user_is_not_found() {
        let service = UserService::new(Clock::fixed(fixed_now()), Arc::new(InMemoryRepository::new()));
        let err = service.record_sign_in(UserId::generate()).await.unwrap_err();
        assert!(matches!(err, UserServiceError::NotFound));
    }
}
