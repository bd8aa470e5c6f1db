//! Owner-scoped storage
//!
//! Storage is exposed as a set of narrow capability traits so that each
//! handler depends only on the operations it performs. [`SqliteStore`]
//! implements all of them on top of a `sqlx` connection pool.
//!
//! Every note query is filtered by `(id, user_id)`: a note owned by somebody
//! else is reported exactly like a note that does not exist.

mod notes;
mod schema;
mod users;

use crate::config::DatabaseConfig;
use crate::models::{Note, User};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("user already exists")]
    UserAlreadyExists,

    #[error("user not found")]
    UserNotFound,

    #[error("note not found")]
    NoteNotFound,

    #[error("{op}: no rows affected")]
    NoRowsAffected { op: &'static str },

    #[error("{op}: {source}")]
    Database {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl StorageError {
    /// Wraps a driver error with the name of the failing operation
    pub(crate) fn database(op: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Database { op, source }
    }
}

/// Can register users
#[async_trait]
pub trait UserCreator: Send + Sync {
    /// Inserts a user and returns its id.
    ///
    /// Fails with [`StorageError::UserAlreadyExists`] when the username is taken,
    /// even if a prior [`UserCreator::user_exists`] check said otherwise.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<i64, StorageError>;

    /// Best-effort existence probe; the unique constraint remains the source of truth.
    async fn user_exists(&self, username: &str) -> Result<bool, StorageError>;
}

/// Can fetch users for authentication
#[async_trait]
pub trait UserProvider: Send + Sync {
    async fn user_by_username(&self, username: &str) -> Result<User, StorageError>;
}

/// Can create notes
#[async_trait]
pub trait NoteCreator: Send + Sync {
    async fn create_note(
        &self,
        owner_id: i64,
        title: &str,
        content: &str,
    ) -> Result<i64, StorageError>;
}

/// Can fetch a single note
#[async_trait]
pub trait NoteProvider: Send + Sync {
    /// Returns [`StorageError::NoteNotFound`] for missing and foreign notes alike.
    async fn note(&self, id: i64, owner_id: i64) -> Result<Note, StorageError>;
}

/// Can list an owner's notes
#[async_trait]
pub trait NotesProvider: Send + Sync {
    /// Notes in insertion order. An owner without notes yields
    /// [`StorageError::NoteNotFound`] rather than an empty list.
    async fn notes(&self, owner_id: i64) -> Result<Vec<Note>, StorageError>;
}

/// Can update notes
#[async_trait]
pub trait NoteUpdater: Send + Sync {
    /// Fails with [`StorageError::NoRowsAffected`] when `(id, owner_id)` matches nothing.
    async fn update_note(
        &self,
        id: i64,
        owner_id: i64,
        title: &str,
        content: &str,
    ) -> Result<(), StorageError>;
}

/// Can delete notes
#[async_trait]
pub trait NoteDeleter: Send + Sync {
    /// Fails with [`StorageError::NoRowsAffected`] when `(id, owner_id)` matches nothing.
    async fn delete_note(&self, id: i64, owner_id: i64) -> Result<(), StorageError>;
}

/// Can report whether the backend is reachable
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> Result<(), StorageError>;
}

/// Every capability at once, for wiring a router around a single backend
pub trait Storage:
    UserCreator
    + UserProvider
    + NoteCreator
    + NoteProvider
    + NotesProvider
    + NoteUpdater
    + NoteDeleter
    + HealthProbe
{
}

impl<T> Storage for T where
    T: UserCreator
        + UserProvider
        + NoteCreator
        + NoteProvider
        + NotesProvider
        + NoteUpdater
        + NoteDeleter
        + HealthProbe
{
}

/// SQLite-backed store
///
/// Cloning is cheap: clones share the underlying pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database described by `config`
    /// and brings the schema up to date.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        const OP: &str = "storage.connect";

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(StorageError::database(OP))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size.max(1))
            .connect_with(options)
            .await
            .map_err(StorageError::database(OP))?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database, used by tests.
    ///
    /// Each SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self, StorageError> {
        const OP: &str = "storage.in_memory";

        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(StorageError::database(OP))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(StorageError::database(OP))?;

        Self::from_pool(pool).await
    }

    /// Wraps an existing pool and applies the schema
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        schema::apply(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl HealthProbe for SqliteStore {
    /// Round-trips a trivial query
    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StorageError::database("storage.ping"))?;
        Ok(())
    }
}
