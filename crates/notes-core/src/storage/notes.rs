use super::{
    NoteCreator, NoteDeleter, NoteProvider, NoteUpdater, NotesProvider, SqliteStore, StorageError,
};
use crate::models::Note;
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl NoteCreator for SqliteStore {
    async fn create_note(
        &self,
        owner_id: i64,
        title: &str,
        content: &str,
    ) -> Result<i64, StorageError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO notes (user_id, title, content, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(owner_id)
        .bind(title)
        .bind(content)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(StorageError::database("storage.create_note"))?;

        Ok(result.last_insert_rowid())
    }
}

#[async_trait]
impl NoteProvider for SqliteStore {
    async fn note(&self, id: i64, owner_id: i64) -> Result<Note, StorageError> {
        sqlx::query_as::<_, Note>(
            "SELECT id, user_id, title, content, created_at, updated_at FROM notes WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::database("storage.note"))?
        .ok_or(StorageError::NoteNotFound)
    }
}

#[async_trait]
impl NotesProvider for SqliteStore {
    async fn notes(&self, owner_id: i64) -> Result<Vec<Note>, StorageError> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT id, user_id, title, content, created_at, updated_at FROM notes WHERE user_id = ? ORDER BY id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::database("storage.notes"))?;

        if notes.is_empty() {
            return Err(StorageError::NoteNotFound);
        }

        Ok(notes)
    }
}

#[async_trait]
impl NoteUpdater for SqliteStore {
    async fn update_note(
        &self,
        id: i64,
        owner_id: i64,
        title: &str,
        content: &str,
    ) -> Result<(), StorageError> {
        const OP: &str = "storage.update_note";

        let result = sqlx::query(
            "UPDATE notes SET title = ?, content = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(title)
        .bind(content)
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::database(OP))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NoRowsAffected { op: OP });
        }

        Ok(())
    }
}

#[async_trait]
impl NoteDeleter for SqliteStore {
    async fn delete_note(&self, id: i64, owner_id: i64) -> Result<(), StorageError> {
        const OP: &str = "storage.delete_note";

        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::database(OP))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NoRowsAffected { op: OP });
        }

        Ok(())
    }
}
