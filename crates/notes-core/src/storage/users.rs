use super::{SqliteStore, StorageError, UserCreator, UserProvider};
use crate::models::User;
use async_trait::async_trait;

#[async_trait]
impl UserCreator for SqliteStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<i64, StorageError> {
        const OP: &str = "storage.create_user";

        let result = sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StorageError::UserAlreadyExists
                }
                other => StorageError::Database {
                    op: OP,
                    source: other,
                },
            })?;

        Ok(result.last_insert_rowid())
    }

    async fn user_exists(&self, username: &str) -> Result<bool, StorageError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::database("storage.user_exists"))?;

        Ok(count > 0)
    }
}

#[async_trait]
impl UserProvider for SqliteStore {
    async fn user_by_username(&self, username: &str) -> Result<User, StorageError> {
        sqlx::query_as::<_, User>("SELECT id, username, password FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::database("storage.user_by_username"))?
            .ok_or(StorageError::UserNotFound)
    }
}
