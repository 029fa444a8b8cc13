//! Preview mode
//!
//! `/api/preview` sets a cookie that makes `/blog/:slug` resolve drafts from
//! the CMS and bypass the page store. `/api/preview/exit` clears it. Both
//! redirect to `route` when it is a same-origin path and to `/blog` otherwise.

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::AppState;
use crate::config::PreviewConfig;
use crate::error::{ServerError, ServerResult};

const DEFAULT_ROUTE: &str = "/blog";

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    route: Option<String>,
    secret: Option<String>,
}

/// Cookie value marking preview mode
pub fn preview_token(config: &PreviewConfig) -> String {
    match &config.secret {
        Some(secret) => hex::encode(Sha256::digest(secret.as_bytes())),
        None => "1".to_string(),
    }
}

/// Whether the request carries a valid preview cookie
pub fn is_preview(jar: &CookieJar, config: &PreviewConfig) -> bool {
    jar.get(&config.cookie_name)
        .map(|cookie| secrets_match(cookie.value(), &preview_token(config)))
        .unwrap_or(false)
}

/// Compare two secrets through their digests in constant time
fn secrets_match(given: &str, expected: &str) -> bool {
    let given = Sha256::digest(given.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());
    given
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// `route` if it stays on this origin, `/blog` otherwise
pub fn safe_redirect_target(route: Option<&str>) -> &str {
    match route {
        Some(route) if is_local_path(route) => route,
        _ => DEFAULT_ROUTE,
    }
}

fn is_local_path(route: &str) -> bool {
    let decoded = percent_decode_str(route).decode_utf8_lossy();
    [route, decoded.as_ref()].iter().all(|path| {
        path.starts_with('/')
            && !path.starts_with("//")
            && !path.contains('\\')
            && !path.chars().any(char::is_control)
    })
}

pub async fn enter(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<PreviewQuery>,
) -> ServerResult<(CookieJar, Redirect)> {
    let config = &state.config.preview;
    if let Some(expected) = &config.secret {
        let valid = query
            .secret
            .as_deref()
            .map_or(false, |given| secrets_match(given, expected));
        if !valid {
            return Err(ServerError::Unauthorized("Invalid preview secret".to_string()));
        }
    }

    let cookie = Cookie::build((config.cookie_name.clone(), preview_token(config)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.max_age_seconds))
        .build();

    let target = safe_redirect_target(query.route.as_deref());
    tracing::debug!("Entering preview mode, redirecting to {}", target);
    Ok((jar.add(cookie), Redirect::temporary(target)))
}

pub async fn exit(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<PreviewQuery>,
) -> (CookieJar, Redirect) {
    let cookie = Cookie::build(state.config.preview.cookie_name.clone()).path("/");
    let target = safe_redirect_target(query.route.as_deref());
    (jar.remove(cookie), Redirect::temporary(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::FallbackPolicy;
    use crate::server::testing::{body_string, test_app};
    use axum::http::{header, StatusCode};

    #[test]
    fn test_safe_redirect_target() {
        assert_eq!(safe_redirect_target(Some("/blog/hello")), "/blog/hello");
        assert_eq!(safe_redirect_target(Some("/app?x=1")), "/app?x=1");
        for bad in [
            "//evil.example",
            "https://evil.example",
            "javascript:alert(1)",
            "/\\evil.example",
            "%2F%2Fevil.example",
            "/%2Fevil.example",
            "/a\nb",
            "",
        ] {
            assert_eq!(safe_redirect_target(Some(bad)), "/blog", "{bad:?}");
        }
        assert_eq!(safe_redirect_target(None), "/blog");
    }

    #[test]
    fn test_preview_token() {
        let mut config = PreviewConfig::default();
        assert_eq!(preview_token(&config), "1");
        config.secret = Some("s3cret".to_string());
        let token = preview_token(&config);
        assert_eq!(token.len(), 64);
        assert_ne!(token, "s3cret");
    }

    #[test]
    fn test_is_preview_checks_value() {
        let config = PreviewConfig::default();
        let jar = CookieJar::new();
        assert!(!is_preview(&jar, &config));
        let jar = jar.add(Cookie::new("known_preview", "nope"));
        assert!(!is_preview(&jar, &config));
        let jar = jar.add(Cookie::new("known_preview", "1"));
        assert!(is_preview(&jar, &config));
    }

    #[tokio::test]
    async fn test_enter_sets_cookie_and_redirects() {
        let app = test_app(SiteConfig::default(), FallbackPolicy::NotFound).await;
        let response = app.get("/api/preview?route=/blog/wip", None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/blog/wip");

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("known_preview=1"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[tokio::test]
    async fn test_enter_rejects_offsite_route() {
        let app = test_app(SiteConfig::default(), FallbackPolicy::NotFound).await;
        let response = app
            .get("/api/preview?route=https://evil.example/", None)
            .await;
        assert_eq!(response.headers()[header::LOCATION], "/blog");
    }

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3cre", "s3cret"));
        assert!(!secrets_match("s3cret ", "s3cret"));
        assert!(!secrets_match("", "s3cret"));
    }

    #[tokio::test]
    async fn test_enter_requires_secret() {
        let mut config = SiteConfig::default();
        config.preview.secret = Some("s3cret".to_string());
        let app = test_app(config, FallbackPolicy::NotFound).await;

        let response = app.get("/api/preview?route=/blog", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app.get("/api/preview?route=/blog&secret=wrong", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app.get("/api/preview?route=/blog&secret=s3cret", None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[tokio::test]
    async fn test_preview_serves_drafts() {
        let app = test_app(SiteConfig::default(), FallbackPolicy::NotFound).await;

        let response = app.get("/blog/wip", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.get("/blog/wip", Some("known_preview=1")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("not yet"));
        assert!(body.contains("Preview mode"));
    }

    #[tokio::test]
    async fn test_exit_clears_cookie() {
        let app = test_app(SiteConfig::default(), FallbackPolicy::NotFound).await;
        let response = app
            .get("/api/preview/exit?route=/blog/hello", Some("known_preview=1"))
            .await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/blog/hello");

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("known_preview="));
        assert!(cookie.contains("Max-Age=0"));
    }
}
