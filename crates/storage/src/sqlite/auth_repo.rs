use kard_core::model::{AuthSession, UserId};

use super::SqliteRepository;
use super::mapping::{db_err, map_credential_row, map_session_row};
use crate::repository::{AuthRepository, CredentialRecord, StorageError};

#[async_trait::async_trait]
impl AuthRepository for SqliteRepository {
    async fn insert_credential(&self, credential: &CredentialRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO credentials (user_id, email, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(credential.user_id.to_string())
        .bind(&credential.email)
        .bind(&credential.password_hash)
        .bind(credential.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn find_credential(&self, email: &str) -> Result<Option<CredentialRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, email, password_hash, created_at
            FROM credentials WHERE email = ?1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_credential_row).transpose()
    }

    async fn delete_credential(&self, user_id: UserId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM credentials WHERE user_id = ?1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn insert_session(&self, session: &AuthSession) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO auth_sessions (token, user_id, email, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(&session.token)
        .bind(session.user_id.to_string())
        .bind(&session.email)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<AuthSession>, StorageError> {
        let row = sqlx::query(
            "SELECT token, user_id, email, created_at FROM auth_sessions WHERE token = ?1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_session_row).transpose()
    }

    async fn delete_session(&self, token: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM auth_sessions WHERE token = ?1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(())
    }
}
