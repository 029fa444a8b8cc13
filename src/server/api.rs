//! JSON API used by the `/app` editor
//!
//! Every route except `/health` needs a live session and answers 401 without
//! one. Folders and documents outside the caller's folders are reported as
//! missing.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::db::{CreateDocument, CreateFolder, Document, Folder, UpdateDocument};
use crate::error::{ServerError, ServerResult};
use crate::session::Session;

#[derive(Debug, Deserialize)]
pub struct NewFolder {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewDocument {
    pub name: String,
    /// Id of the containing folder
    pub folder: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

async fn require_session(state: &AppState, jar: &CookieJar) -> ServerResult<Session> {
    state
        .sessions
        .get_session(jar)
        .await
        .ok_or_else(|| ServerError::Unauthorized("Sign in required".to_string()))
}

fn required_name(name: &str) -> ServerResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServerError::BadRequest("Name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

pub async fn create_folder(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<NewFolder>,
) -> ServerResult<(StatusCode, Json<Folder>)> {
    let session = require_session(&state, &jar).await?;
    let folder = Folder::create(
        state.db.pool(),
        CreateFolder {
            owner_id: session.user.id,
            name: required_name(&body.name)?,
        },
    )
    .await?;

    tracing::info!("Created folder {}", folder.id);
    Ok((StatusCode::CREATED, Json(folder)))
}

pub async fn create_doc(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<NewDocument>,
) -> ServerResult<(StatusCode, Json<Document>)> {
    let session = require_session(&state, &jar).await?;
    let name = required_name(&body.name)?;

    let folder = Folder::find_owned(state.db.pool(), &body.folder, &session.user.id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Folder not found".to_string()))?;

    let doc = Document::create(
        state.db.pool(),
        CreateDocument {
            folder_id: folder.id,
            created_by: session.user.id,
            name,
            content: None,
        },
    )
    .await?;

    tracing::info!("Created document {}", doc.id);
    Ok((StatusCode::CREATED, Json(doc)))
}

pub async fn update_doc(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
    Json(mut body): Json<UpdateDocument>,
) -> ServerResult<Json<Document>> {
    let session = require_session(&state, &jar).await?;
    if let Some(name) = body.name.as_deref() {
        body.name = Some(required_name(name)?);
    }

    let doc = Document::update(state.db.pool(), &id, &session.user.id, body)
        .await?
        .ok_or_else(|| ServerError::NotFound("Document not found".to_string()))?;

    Ok(Json(doc))
}

pub async fn health(State(state): State<AppState>) -> ServerResult<Json<HealthResponse>> {
    state.db.ping().await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}
