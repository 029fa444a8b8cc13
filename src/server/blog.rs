//! `/blog` routes

use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use super::{is_preview, AppState};
use crate::blog::{render_post, Lookup};
use crate::error::{ServerError, ServerResult};

pub async fn index(State(state): State<AppState>, jar: CookieJar) -> ServerResult<Html<String>> {
    let preview = is_preview(&jar, &state.config.preview);
    let content = Arc::clone(&state.content);
    let posts = tokio::task::spawn_blocking(move || content.get_posts())
        .await
        .map_err(ServerError::internal)??;

    Ok(Html(state.templates.blog_index(&posts, preview)?))
}

pub async fn post(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> ServerResult<Response> {
    if is_preview(&jar, &state.config.preview) {
        let content = Arc::clone(&state.content);
        let templates = Arc::clone(&state.templates);
        let html = tokio::task::spawn_blocking(move || {
            render_post(&content, &templates, &slug, true)
        })
        .await
        .map_err(ServerError::internal)??;
        return Ok(([(header::CACHE_CONTROL, "no-store")], Html(html)).into_response());
    }

    match state.pages.get(&slug).await? {
        Lookup::Page(html) => Ok(Html(html.as_str().to_owned()).into_response()),
        Lookup::Placeholder => Ok((
            [(header::CACHE_CONTROL, "no-store")],
            Html(state.templates.placeholder()?),
        )
            .into_response()),
        Lookup::NotFound => Err(ServerError::NotFound("Post not found".to_string())),
    }
}
