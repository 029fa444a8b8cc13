//! Error handling for the HTTP server
//!
//! Handlers return `Result<T, ServerError>`, which converts into a response
//! with the matching status code. Internal errors are logged with their full
//! cause chain and answered with a generic message; nothing about the failure
//! reaches the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use crate::app::AppError;
use crate::content::ContentError;

/// Server result type alias
pub type ServerResult<T> = Result<T, ServerError>;

/// Unified handler error type
#[derive(Debug)]
pub enum ServerError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Internal server error (500)
    Internal(anyhow::Error),
}

/// Attached to error responses so page routes can render them with the layout
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub message: String,
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ServerError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ServerError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ServerError::Internal(err) => write!(f, "Internal error: {:#}", err),
        }
    }
}

impl std::error::Error for ServerError {}

impl ServerError {
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        ServerError::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ServerError::BadRequest(msg)
            | ServerError::Unauthorized(msg)
            | ServerError::NotFound(msg) => msg,
            ServerError::Internal(err) => {
                tracing::error!("Internal error: {:?}", err);
                "An internal error occurred".to_string()
            }
        };

        let mut response = (status, message.clone()).into_response();
        response
            .extensions_mut()
            .insert(ErrorPage { status, message });
        response
    }
}

impl From<ContentError> for ServerError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound { .. } | ContentError::InvalidSlug(_) => {
                tracing::debug!("{}", err);
                ServerError::NotFound("Post not found".to_string())
            }
            other => ServerError::internal(other),
        }
    }
}

impl From<AppError> for ServerError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::FolderNotFound(_) | AppError::DocumentNotFound(_) | AppError::InvalidPath(_) => {
                tracing::debug!("{}", err);
                ServerError::NotFound("Page not found".to_string())
            }
            AppError::Database(e) => ServerError::from(e),
        }
    }
}

impl From<sqlx::Error> for ServerError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ServerError::NotFound("Resource not found".to_string()),
            other => ServerError::Internal(anyhow::Error::new(other).context("Database error")),
        }
    }
}

impl From<tera::Error> for ServerError {
    fn from(err: tera::Error) -> Self {
        ServerError::Internal(anyhow::Error::new(err).context("Template error"))
    }
}
