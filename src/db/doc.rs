//! Document model and queries
//!
//! ```sql
//! CREATE TABLE documents (
//!     id TEXT PRIMARY KEY NOT NULL,
//!     folder_id TEXT NOT NULL REFERENCES folders(id),
//!     created_by TEXT NOT NULL REFERENCES users(id),
//!     name TEXT NOT NULL,
//!     content TEXT,
//!     created_at TEXT NOT NULL
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

/// A document inside exactly one folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: String,
    pub folder_id: String,
    pub created_by: String,
    pub name: String,
    /// Editor state, stored as JSON text
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    pub folder_id: String,
    pub created_by: String,
    pub name: String,
    pub content: Option<String>,
}

/// Input for updating a document. Only non-None fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDocument {
    pub name: Option<String>,
    pub content: Option<String>,
}

impl Document {
    pub async fn create(pool: &SqlitePool, data: CreateDocument) -> Result<Self, sqlx::Error> {
        let doc = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (id, folder_id, created_by, name, content, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, folder_id, created_by, name, content, created_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(data.folder_id)
        .bind(data.created_by)
        .bind(data.name)
        .bind(data.content)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok(doc)
    }

    /// Every document whose folder is `folder_id`, oldest first
    pub async fn find_by_folder(
        pool: &SqlitePool,
        folder_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Document>(
            r#"
            SELECT id, folder_id, created_by, name, content, created_at
            FROM documents
            WHERE folder_id = ?
            ORDER BY rowid ASC
            "#,
        )
        .bind(folder_id)
        .fetch_all(pool)
        .await
    }

    /// A document by id, in any folder owned by `owner_id`
    pub async fn find_owned(
        pool: &SqlitePool,
        id: &str,
        owner_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Document>(
            r#"
            SELECT d.id, d.folder_id, d.created_by, d.name, d.content, d.created_at
            FROM documents d
            JOIN folders f ON f.id = d.folder_id
            WHERE d.id = ? AND f.owner_id = ?
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
    }

    /// Apply `data` to a document owned by `owner_id`; None if there is none
    pub async fn update(
        pool: &SqlitePool,
        id: &str,
        owner_id: &str,
        data: UpdateDocument,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET name = COALESCE(?, name),
                content = COALESCE(?, content)
            WHERE id = ?
              AND folder_id IN (SELECT id FROM folders WHERE owner_id = ?)
            RETURNING id, folder_id, created_by, name, content, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.content)
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
    use crate::db::{CreateFolder, Database, Folder};

    async fn folder(db: &Database, owner: &str, name: &str) -> Folder {
        Folder::create(
            db.pool(),
            CreateFolder {
                owner_id: owner.to_string(),
                name: name.to_string(),
            },
        )
        .await
        .unwrap()
    }

    async fn doc(db: &Database, folder: &Folder, name: &str) -> Document {
        Document::create(
            db.pool(),
            CreateDocument {
                folder_id: folder.id.clone(),
                created_by: folder.owner_id.clone(),
                name: name.to_string(),
                content: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_find_by_folder() {
        let db = Database::in_memory().await.unwrap();
        seed_user(&db, "u1", "Ada").await;
        let work = folder(&db, "u1", "Work").await;
        let home = folder(&db, "u1", "Home").await;
        let a = doc(&db, &work, "a").await;
        let b = doc(&db, &work, "b").await;
        doc(&db, &home, "c").await;

        let docs = Document::find_by_folder(db.pool(), &work.id).await.unwrap();
        assert_eq!(docs, vec![a, b]);
        assert!(Document::find_by_folder(db.pool(), "nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_and_update_are_owner_scoped() {
        let db = Database::in_memory().await.unwrap();
        seed_user(&db, "u1", "Ada").await;
        seed_user(&db, "u2", "Bob").await;
        let work = folder(&db, "u1", "Work").await;
        let d = doc(&db, &work, "draft").await;

        assert_eq!(
            Document::find_owned(db.pool(), &d.id, "u1").await.unwrap(),
            Some(d.clone())
        );
        assert_eq!(Document::find_owned(db.pool(), &d.id, "u2").await.unwrap(), None);

        let stolen = Document::update(
            db.pool(),
            &d.id,
            "u2",
            UpdateDocument {
                name: Some("mine".to_string()),
                content: None,
            },
        )
        .await
        .unwrap();
        assert!(stolen.is_none());

        let updated = Document::update(
            db.pool(),
            &d.id,
            "u1",
            UpdateDocument {
                name: None,
                content: Some(r#"{"blocks":[]}"#.to_string()),
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.name, "draft");
        assert_eq!(updated.content.as_deref(), Some(r#"{"blocks":[]}"#));
    }
}
