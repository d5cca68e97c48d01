use chrono::{DateTime, Utc};
use kard_core::model::{UserId, UserRecord};

use super::SqliteRepository;
use super::mapping::{db_err, map_user_row};
use crate::repository::{StorageError, UserRepository};

const SELECT_USER: &str = r"
    SELECT u.id, u.email, u.created_at, u.last_login, p.display_name, p.bio
    FROM users u
    LEFT JOIN profiles p ON p.user_id = u.id
    WHERE u.id = ?1
";

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn create_user(&self, user: &UserRecord) -> Result<(), StorageError> {
        let id = user.id.to_string();
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            r"
            INSERT INTO users (id, email, created_at, last_login)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(&id)
        .bind(&user.email)
        .bind(user.created_at)
        .bind(user.last_login)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query("INSERT INTO profiles (user_id, display_name, bio) VALUES (?1, ?2, ?3)")
            .bind(&id)
            .bind(user.profile.display_name.as_deref())
            .bind(user.profile.bio.as_deref())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query(SELECT_USER)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn record_login(
        &self,
        id: UserId,
        at: DateTime<Utc>,
    ) -> Result<UserRecord, StorageError> {
        let res = sqlx::query("UPDATE users SET last_login = ?1 WHERE id = ?2")
            .bind(at)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        self.get_user(id).await?.ok_or(StorageError::NotFound)
    }
}
