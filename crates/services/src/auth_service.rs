use std::sync::Arc;

use kard_core::model::{AuthSession, UserId, UserRecord};
use storage::repository::{AuthRepository, CredentialRecord, StorageError};
use uuid::Uuid;

use crate::Clock;
use crate::app_state::AppStateStore;
use crate::credentials::{hash_password, verify_password};
use crate::error::{AuthError, UserServiceError};
use crate::user_service::UserService;

/// Password accounts and sessions.
///
/// The current session lives in the [`AppStateStore`], so subscribing there
/// is how callers observe sign-in and sign-out.
#[derive(Clone)]
pub struct AuthService {
    clock: Clock,
    auth: Arc<dyn AuthRepository>,
    users: Arc<UserService>,
    state: Arc<AppStateStore>,
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !valid {
        return Err(AuthError::InvalidEmail);
    }
    Ok(email.to_owned())
}

impl AuthService {
    #[must_use]
    pub fn new(
        clock: Clock,
        auth: Arc<dyn AuthRepository>,
        users: Arc<UserService>,
        state: Arc<AppStateStore>,
    ) -> Self {
        Self {
            clock,
            auth,
            users,
            state,
        }
    }

    /// Register an account and create its user record. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns a validation variant (`InvalidEmail`, `EmptyPassword`,
    /// `PasswordMismatch`) before touching storage, `EmailTaken` for a
    /// registered email, or a storage/user failure.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<UserRecord, AuthError> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let credential = CredentialRecord {
            user_id: UserId::generate(),
            email: email.clone(),
            password_hash: hash_password(password)?,
            created_at: self.clock.now(),
        };
        self.auth
            .insert_credential(&credential)
            .await
            .map_err(|e| match e {
                StorageError::Conflict => AuthError::EmailTaken,
                other => {
                    tracing::error!(error = %other, "error storing credential");
                    AuthError::Storage(other)
                }
            })?;

        let user = match self.users.mirror_sign_up(credential.user_id, &email).await {
            Ok(user) => user,
            Err(err) => {
                // The credential alone would block both sign-in and a retry.
                if let Err(cleanup) = self.auth.delete_credential(credential.user_id).await {
                    tracing::error!(
                        user_id = %credential.user_id,
                        error = %cleanup,
                        "error removing credential of failed sign-up"
                    );
                }
                return Err(match err {
                    UserServiceError::Storage(StorageError::Conflict) => AuthError::EmailTaken,
                    other => AuthError::User(other),
                });
            }
        };
        tracing::info!(user_id = %user.id, "account created");
        Ok(user)
    }

    /// Verify a password, open a session and make it this device's current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or wrong
    /// password, or a storage/user failure.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let session = self.authenticate(email, password).await?;
        self.state.set_session(Some(session.clone()));
        Ok(session)
    }

    /// Verify a password and issue a session token without changing local
    /// state. The HTTP server hands these out to remote clients.
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::sign_in`].
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }

        let Some(credential) = self.auth.find_credential(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(password, &credential.password_hash)? {
            tracing::warn!(user_id = %credential.user_id, "rejected sign-in");
            return Err(AuthError::InvalidCredentials);
        }

        let session = AuthSession {
            token: Uuid::new_v4().simple().to_string(),
            user_id: credential.user_id,
            email: credential.email,
            created_at: self.clock.now(),
        };
        self.users.record_sign_in(session.user_id).await?;
        self.auth.insert_session(&session).await?;
        tracing::info!(user_id = %session.user_id, "signed in");
        Ok(session)
    }

    /// Close the current session, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the session row cannot be removed; the
    /// local state is cleared regardless.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let current = self.state.session();
        self.state.set_session(None);
        if let Some(session) = current {
            self.auth.delete_session(&session.token).await?;
            tracing::info!(user_id = %session.user_id, "signed out");
        }
        Ok(())
    }

    /// Close a session by token without touching local state.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` on backend failures.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        self.auth.delete_session(token).await?;
        Ok(())
    }

    #[must_use]
    pub fn current_session(&self) -> Option<AuthSession> {
        self.state.session()
    }

    /// Look up an issued session by token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` on backend failures.
    pub async fn resolve(&self, token: &str) -> Result<Option<AuthSession>, AuthError> {
        Ok(self.auth.get_session(token).await?)
    }

    /// Re-establish the session remembered on this device.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` on backend failures.
    pub async fn restore(&self) -> Result<Option<AuthSession>, AuthError> {
        let Some(token) = self.state.remembered_token() else {
            return Ok(None);
        };
        let session = self.resolve(&token).await?;
        if session.is_none() {
            tracing::info!("remembered session expired");
        }
        self.state.set_session(session.clone());
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kard_core::time::fixed_now;
    use storage::local::InMemoryLocalStore;
    use std::sync::atomic::{AtomicBool, Ordering};
    use storage::repository::{Storage, UserRepository};

    struct Fixture {
        auth: AuthService,
        storage: Storage,
        local: InMemoryLocalStore,
    }

    fn fixture() -> Fixture {
        let storage = Storage::in_memory();
        let local = InMemoryLocalStore::new();
        let clock = Clock::fixed(fixed_now());
        let users = Arc::new(UserService::new(clock, Arc::clone(&storage.users)));
        let state = Arc::new(AppStateStore::load(Arc::new(local.clone())));
        let auth = AuthService::new(clock, Arc::clone(&storage.auth), users, state);
        Fixture {
            auth,
            storage,
            local,
        }
    }

    #[tokio::test]
    async fn sign_up_validates_before_storage() {
        let f = fixture();
        assert!(matches!(
            f.auth.sign_up("no-at-sign", "pw", "pw").await.unwrap_err(),
            AuthError::InvalidEmail
        ));
        assert!(matches!(
            f.auth.sign_up("ana@example.com", "", "").await.unwrap_err(),
            AuthError::EmptyPassword
        ));
        let err = f
            .auth
            .sign_up("ana@example.com", "one", "two")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match");
        assert!(
            f.storage
                .auth
                .find_credential("ana@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn sign_up_mirrors_user_and_rejects_duplicates() {
        let f = fixture();
        let user = f
            .auth
            .sign_up("ana@example.com", "Secret123!", "Secret123!")
            .await
            .unwrap();
        let stored = f.storage.users.get_user(user.id).await.unwrap().unwrap();
        assert!(stored.last_login.is_none());
        assert!(f.auth.current_session().is_none());

        let err = f
            .auth
            .sign_up("ANA@example.com", "x", "x")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn failed_user_mirror_leaves_no_credential_behind() {
        let f = fixture();
        // A user record already owns the email, so the mirror step conflicts.
        let users = UserService::new(Clock::fixed(fixed_now()), Arc::clone(&f.storage.users));
        users
            .mirror_sign_up(UserId::generate(), "ana@example.com")
            .await
            .unwrap();

        let err = f
            .auth
            .sign_up("ana@example.com", "Secret123!", "Secret123!")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
        assert!(
            f.storage
                .auth
                .find_credential("ana@example.com")
                .await
                .unwrap()
                .is_none()
        );

        let err = f
            .auth
            .sign_in("ana@example.com", "Secret123!")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn sign_up_can_be_retried_after_user_store_failure() {
        let storage = Storage::in_memory();
        let flaky = Arc::new(FailOnceUsers {
            inner: Arc::clone(&storage.users),
            failed: AtomicBool::new(false),
        });
        let clock = Clock::fixed(fixed_now());
        let users = Arc::new(UserService::new(clock, flaky));
        let state = Arc::new(AppStateStore::load(Arc::new(InMemoryLocalStore::new())));
        let auth = AuthService::new(clock, Arc::clone(&storage.auth), users, state);

        let err = auth
            .sign_up("ana@example.com", "Secret123!", "Secret123!")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::User(UserServiceError::Storage(_))));

        let user = auth
            .sign_up("ana@example.com", "Secret123!", "Secret123!")
            .await
            .unwrap();
        let session = auth.sign_in("ana@example.com", "Secret123!").await.unwrap();
        assert_eq!(session.user_id, user.id);
    }

    #[tokio::test]
    async fn sign_in_without_user_record_issues_no_session() {
        let f = fixture();
        let credential = CredentialRecord {
            user_id: UserId::generate(),
            email: "ana@example.com".to_owned(),
            password_hash: hash_password("Secret123!").unwrap(),
            created_at: fixed_now(),
        };
        f.storage.auth.insert_credential(&credential).await.unwrap();

        let err = f
            .auth
            .sign_in("ana@example.com", "Secret123!")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::User(UserServiceError::NotFound)));
        assert!(f.auth.current_session().is_none());
    }

    struct FailOnceUsers {
        inner: Arc<dyn UserRepository>,
        failed: AtomicBool,
    }

    #[async_trait::async_trait]
    impl UserRepository for FailOnceUsers {
        async fn create_user(&self, user: &UserRecord) -> Result<(), StorageError> {
            if !self.failed.swap(true, Ordering::SeqCst) {
                return Err(StorageError::Connection("database is locked".to_owned()));
            }
            self.inner.create_user(user).await
        }

        async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>, StorageError> {
            self.inner.get_user(id).await
        }

        async fn record_login(
            &self,
            id: UserId,
            at: chrono::DateTime<chrono::Utc>,
        ) -> Result<UserRecord, StorageError> {
            self.inner.record_login(id, at).await
        }
    }

    #[tokio::test]
    async fn sign_in_opens_session_and_stamps_login() {
        let f = fixture();
        let user = f
            .auth
            .sign_up("ana@example.com", "Secret123!", "Secret123!")
            .await
            .unwrap();
        let mut rx = f.auth.state.subscribe();

        let session = f.auth.sign_in("ana@example.com", "Secret123!").await.unwrap();
        assert_eq!(session.user_id, user.id);
        assert!(rx.has_changed().unwrap());
        assert_eq!(f.auth.current_session(), Some(session.clone()));

        let stored = f.storage.users.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.last_login, Some(fixed_now()));
        assert_eq!(f.auth.resolve(&session.token).await.unwrap(), Some(session));
    }

    #[tokio::test]
    async fn sign_in_rejects_wrong_password() {
        let f = fixture();
        f.auth
            .sign_up("ana@example.com", "Secret123!", "Secret123!")
            .await
            .unwrap();
        let err = f.auth.sign_in("ana@example.com", "nope").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        let err = f.auth.sign_in("bob@example.com", "nope").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(f.auth.current_session().is_none());
    }

    #[tokio::test]
    async fn authenticate_leaves_device_state_alone() {
        let f = fixture();
        f.auth
            .sign_up("ana@example.com", "Secret123!", "Secret123!")
            .await
            .unwrap();
        let session = f
            .auth
            .authenticate("ana@example.com", "Secret123!")
            .await
            .unwrap();
        assert!(f.auth.current_session().is_none());
        assert!(f.auth.state.remembered_token().is_none());

        f.auth.revoke(&session.token).await.unwrap();
        assert!(f.auth.resolve(&session.token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sign_out_clears_session_and_restore_finds_nothing() {
        let f = fixture();
        f.auth
            .sign_up("ana@example.com", "Secret123!", "Secret123!")
            .await
            .unwrap();
        let session = f.auth.sign_in("ana@example.com", "Secret123!").await.unwrap();

        f.auth.sign_out().await.unwrap();
        assert!(f.auth.current_session().is_none());
        assert!(f.auth.resolve(&session.token).await.unwrap().is_none());
        assert!(f.auth.restore().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn restore_uses_remembered_token() {
        let f = fixture();
        f.auth
            .sign_up("ana@example.com", "Secret123!", "Secret123!")
            .await
            .unwrap();
        let session = f.auth.sign_in("ana@example.com", "Secret123!").await.unwrap();

        let state = Arc::new(AppStateStore::load(Arc::new(f.local.clone())));
        let users = Arc::new(UserService::new(
            Clock::fixed(fixed_now()),
            Arc::clone(&f.storage.users),
        ));
        let fresh = AuthService::new(
            Clock::fixed(fixed_now()),
            Arc::clone(&f.storage.auth),
            users,
            state,
        );
        assert!(fresh.current_session().is_none());
        assert_eq!(fresh.restore().await.unwrap(), Some(session.clone()));
        assert_eq!(fresh.current_session(), Some(session));
    }
}
