//! `/app` and `/signin` routes

use axum::{
    extract::{Path, State},
    response::Html,
};
use axum_extra::extract::cookie::CookieJar;

use super::AppState;
use crate::app;
use crate::error::ServerResult;

pub async fn index(State(state): State<AppState>, jar: CookieJar) -> ServerResult<Html<String>> {
    render(&state, &jar, Vec::new()).await
}

pub async fn path(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> ServerResult<Html<String>> {
    let segments = id
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    render(&state, &jar, segments).await
}

async fn render(
    state: &AppState,
    jar: &CookieJar,
    segments: Vec<String>,
) -> ServerResult<Html<String>> {
    let session = state.sessions.get_session(jar).await;
    let props = app::resolve(&state.db, session, &segments).await?;
    Ok(Html(state.templates.app(&props)?))
}

pub async fn signin(State(state): State<AppState>) -> ServerResult<Html<String>> {
    Ok(Html(state.templates.signin()?))
}
