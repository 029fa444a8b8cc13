//! Folder model and queries
//!
//! ```sql
//! CREATE TABLE folders (
//!     id TEXT PRIMARY KEY NOT NULL,
//!     owner_id TEXT NOT NULL REFERENCES users(id),
//!     name TEXT NOT NULL,
//!     created_at TEXT NOT NULL
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

/// A folder owned by exactly one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Folder {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    pub owner_id: String,
    pub name: String,
}

impl Folder {
    pub async fn create(pool: &SqlitePool, data: CreateFolder) -> Result<Self, sqlx::Error> {
        let folder = sqlx::query_as::<_, Folder>(
            r#"
            INSERT INTO folders (id, owner_id, name, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, owner_id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(data.owner_id)
        .bind(data.name)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(folder)
    }

    /// All folders of a user, oldest first
    pub async fn find_by_owner(pool: &SqlitePool, owner_id: &str) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Folder>(
            r#"
            SELECT id, owner_id, name, created_at
            FROM folders
            WHERE owner_id = ?
            ORDER BY rowid ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await
    }

    /// A folder by id, only if `owner_id` owns it
    pub async fn find_owned(
        pool: &SqlitePool,
        id: &str,
        owner_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Folder>(
            r#"
            SELECT id, owner_id, name, created_at
            FROM folders
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::seed_user;
    use crate::db::Database;

    #[tokio::test]
    async fn test_folders_are_scoped_to_owner() {
        let db = Database::in_memory().await.unwrap();
        seed_user(&db, "u1", "Ada").await;
        seed_user(&db, "u2", "Bob").await;

        let mine = Folder::create(
            db.pool(),
            CreateFolder {
                owner_id: "u1".to_string(),
                name: "Notes".to_string(),
            },
        )
        .await
        .unwrap();
        Folder::create(
            db.pool(),
            CreateFolder {
                owner_id: "u2".to_string(),
                name: "Theirs".to_string(),
            },
        )
        .await
        .unwrap();

        let folders = Folder::find_by_owner(db.pool(), "u1").await.unwrap();
        assert_eq!(folders, vec![mine.clone()]);

        assert_eq!(
            Folder::find_owned(db.pool(), &mine.id, "u1").await.unwrap(),
            Some(mine.clone())
        );
        assert_eq!(Folder::find_owned(db.pool(), &mine.id, "u2").await.unwrap(), None);
    }
}
