//! User and note records
//!
//! Both map one-to-one onto rows of the `users` and `notes` tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Registered account
///
/// The password hash never leaves the server: it is skipped on serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    #[sqlx(rename = "password")]
    pub password_hash: String,
}

/// A note owned by exactly one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Note {
    pub id: i64,
    /// Owner of the note
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every update
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_hides_hash() {
        let user = User {
            id: 7,
            username: "alice".to_string(),
            password_hash: "$argon2id$v=19$secret".to_string(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("alice"));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2id"));
    }

    #[test]
    fn test_note_field_names() {
        let now = Utc::now();
        let note = Note {
            id: 1,
            user_id: 2,
            title: "T".to_string(),
            content: String::new(),
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&note).unwrap();
        for key in ["id", "user_id", "title", "content", "created_at", "updated_at"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
