//! Folder/document browser state for `/app/[[...id]]`
//!
//! The route takes up to two path segments:
//!
//! 1. `/app`                   - folder list, nothing selected
//! 2. `/app/:folder`           - folder selected, its documents listed
//! 3. `/app/:folder/:doc`      - document selected as well
//!
//! Signed-out requests resolve to [`AppProps::Unauthenticated`], which renders
//! a sign-in prompt instead of an error.

use serde::Serialize;

use crate::db::{Database, Document, Folder};
use crate::session::Session;

/// Errors while resolving the browser state
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("folder {0:?} not found")]
    FolderNotFound(String),

    #[error("document {0:?} not found")]
    DocumentNotFound(String),

    #[error("unexpected path /app/{0}")]
    InvalidPath(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Page props, one variant per state of the route
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AppProps {
    Unauthenticated,
    FolderList {
        session: Session,
        folders: Vec<Folder>,
    },
    FolderView {
        session: Session,
        folders: Vec<Folder>,
        folder: Folder,
        docs: Vec<Document>,
    },
    DocumentView {
        session: Session,
        folders: Vec<Folder>,
        folder: Folder,
        docs: Vec<Document>,
        doc: Document,
    },
}

/// What the main pane shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View<'a> {
    SignIn,
    Empty,
    Folder {
        folder: &'a Folder,
        docs: &'a [Document],
    },
    Document {
        folder: &'a Folder,
        doc: &'a Document,
    },
}

impl AppProps {
    /// Document beats folder beats the empty shell
    pub fn view(&self) -> View<'_> {
        match self {
            AppProps::Unauthenticated => View::SignIn,
            AppProps::DocumentView { folder, doc, .. } => View::Document { folder, doc },
            AppProps::FolderView { folder, docs, .. } => View::Folder { folder, docs },
            AppProps::FolderList { .. } => View::Empty,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AppProps::Unauthenticated => None,
            AppProps::FolderList { session, .. }
            | AppProps::FolderView { session, .. }
            | AppProps::DocumentView { session, .. } => Some(session),
        }
    }

    pub fn folders(&self) -> &[Folder] {
        match self {
            AppProps::Unauthenticated => &[],
            AppProps::FolderList { folders, .. }
            | AppProps::FolderView { folders, .. }
            | AppProps::DocumentView { folders, .. } => folders,
        }
    }
}

/// Resolve the browser state for `segments` (the path after `/app`)
pub async fn resolve(
    db: &Database,
    session: Option<Session>,
    segments: &[String],
) -> Result<AppProps, AppError> {
    let Some(session) = session else {
        return Ok(AppProps::Unauthenticated);
    };

    let folders = Folder::find_by_owner(db.pool(), &session.user.id).await?;

    let (folder_id, doc_id) = match segments {
        [] => return Ok(AppProps::FolderList { session, folders }),
        [folder_id] => (folder_id, None),
        [folder_id, doc_id] => (folder_id, Some(doc_id)),
        _ => return Err(AppError::InvalidPath(segments.join("/"))),
    };

    let folder = folders
        .iter()
        .find(|f| &f.id == folder_id)
        .cloned()
        .ok_or_else(|| AppError::FolderNotFound(folder_id.clone()))?;
    let docs = Document::find_by_folder(db.pool(), &folder.id).await?;

    let Some(doc_id) = doc_id else {
        return Ok(AppProps::FolderView {
            session,
            folders,
            folder,
            docs,
        });
    };

    let doc = Document::find_owned(db.pool(), doc_id, &session.user.id)
        .await?
        .ok_or_else(|| AppError::DocumentNotFound(doc_id.clone()))?;

    Ok(AppProps::DocumentView {
        session,
        folders,
        folder,
        docs,
        doc,
    })
}
