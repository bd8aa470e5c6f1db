use super::StorageError;
use sqlx::SqlitePool;

/// Idempotent schema statements, applied in order at startup
const STATEMENTS: &[(&str, &str)] = &[
    (
        "create users table",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        )
        "#,
    ),
    (
        "create notes table",
        r#"
        CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "create notes(user_id) index",
        "CREATE INDEX IF NOT EXISTS idx_notes_user_id ON notes(user_id)",
    ),
    (
        "create notes(id, user_id) index",
        "CREATE INDEX IF NOT EXISTS idx_notes_id_user_id ON notes(id, user_id)",
    ),
];

pub(super) async fn apply(pool: &SqlitePool) -> Result<(), StorageError> {
    for &(step, sql) in STATEMENTS {
        tracing::debug!(step, "applying schema");
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(StorageError::database("storage.schema"))?;
    }
    Ok(())
}
