//! Session lookup
//!
//! Sessions are issued by the external auth provider, which writes them into
//! the `sessions` table and hands the browser a session cookie. This module
//! only reads them: a missing cookie, an unknown or expired token, and a
//! failed lookup all mean "no session".

use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Database;

/// The signed-in user as seen by pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

/// A live session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    expires: DateTime<Utc>,
    id: String,
    name: Option<String>,
    email: Option<String>,
    image: Option<String>,
}

/// Resolves session cookies against the sessions table
#[derive(Debug, Clone)]
pub struct SessionStore {
    db: Database,
    cookie_name: String,
}

impl SessionStore {
    pub fn new(db: Database, cookie_name: impl Into<String>) -> Self {
        Self {
            db,
            cookie_name: cookie_name.into(),
        }
    }

    /// The current session, if the request carries a live one
    pub async fn get_session(&self, jar: &CookieJar) -> Option<Session> {
        let token = jar.get(&self.cookie_name)?.value().to_string();
        if token.is_empty() {
            return None;
        }

        match self.find(&token, Utc::now()).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Session lookup failed, treating as signed out: {}", e);
                None
            }
        }
    }

    /// Look up a token, ignoring sessions that expired before `now`
    pub async fn find(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Session>, sqlx::Error> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT s.expires, u.id, u.name, u.email, u.image
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.session_token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.filter(|r| r.expires > now).map(|r| Session {
            user: SessionUser {
                id: r.id,
                name: r.name,
                email: r.email,
                image: r.image,
            },
            expires: r.expires,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{seed_session, seed_user};
    use axum_extra::extract::cookie::Cookie;
    use chrono::Duration;

    const COOKIE: &str = "known.session-token";

    async fn store() -> SessionStore {
        let db = Database::in_memory().await.unwrap();
        seed_user(&db, "u1", "Ada").await;
        seed_session(&db, "live", "u1", Utc::now() + Duration::days(1)).await;
        seed_session(&db, "stale", "u1", Utc::now() - Duration::days(1)).await;
        SessionStore::new(db, COOKIE)
    }

    fn jar(token: &str) -> CookieJar {
        CookieJar::new().add(Cookie::new(COOKIE, token.to_string()))
    }

    #[tokio::test]
    async fn test_live_session_resolves_user() {
        let store = store().await;
        let session = store.get_session(&jar("live")).await.unwrap();
        assert_eq!(session.user.id, "u1");
        assert_eq!(session.user.name.as_deref(), Some("Ada"));
        assert_eq!(session.user.email.as_deref(), Some("u1@example.com"));
    }

    #[tokio::test]
    async fn test_absent_sessions() {
        let store = store().await;
        assert!(store.get_session(&CookieJar::new()).await.is_none());
        assert!(store.get_session(&jar("")).await.is_none());
        assert!(store.get_session(&jar("unknown")).await.is_none());
        assert!(store.get_session(&jar("stale")).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_lookup_is_no_session() {
        let store = store().await;
        store.db.close().await;
        assert!(store.get_session(&jar("live")).await.is_none());
    }
}
