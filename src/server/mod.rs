//! HTTP server
//!
//! ```text
//! /
//! ├── GET        /                 -> redirect to /blog
//! ├── GET|POST   /app[/*id]        folder/document browser
//! ├── GET        /signin
//! ├── GET        /blog             post listing
//! ├── GET        /blog/:slug       single post
//! ├── GET        /static/*         files from the static dir
//! ├── GET        /api/preview[/exit]
//! ├── POST       /api/folder
//! ├── POST       /api/doc
//! ├── PUT        /api/doc/:id
//! └── GET        /health
//! ```

mod api;
mod app;
mod blog;
mod preview;

pub use preview::{is_preview, preview_token, safe_redirect_target};

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post, put},
    Router,
};
use std::any::Any;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::blog::PageStore;
use crate::config::SiteConfig;
use crate::content::ContentResolver;
use crate::db::Database;
use crate::error::ErrorPage;
use crate::session::SessionStore;
use crate::templates::TemplateRenderer;
use crate::Known;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionStore,
    pub content: Arc<ContentResolver>,
    pub templates: Arc<TemplateRenderer>,
    pub pages: Arc<PageStore>,
    pub config: Arc<SiteConfig>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(
        db: Database,
        config: SiteConfig,
        content: ContentResolver,
        static_dir: PathBuf,
    ) -> Result<Self> {
        let templates = Arc::new(TemplateRenderer::new(&config)?);
        let content = Arc::new(content);
        let pages = Arc::new(PageStore::new(Arc::clone(&content), Arc::clone(&templates)));
        let sessions = SessionStore::new(db.clone(), config.session.cookie_name.clone());

        Ok(Self {
            db,
            sessions,
            content,
            templates,
            pages,
            config: Arc::new(config),
            static_dir,
        })
    }
}

/// Build the router with every route and the middleware stack
pub fn build_router(state: AppState) -> Router {
    let pages = Router::new()
        .route("/", get(|| async { Redirect::to("/blog") }))
        .route("/app", get(app::index).post(app::index))
        .route("/app/*id", get(app::path).post(app::path))
        .route("/signin", get(app::signin))
        .route("/blog", get(blog::index))
        .route("/blog/:slug", get(blog::post))
        .layer(axum::middleware::map_response_with_state(
            state.clone(),
            render_error_pages,
        ));

    let api = Router::new()
        .route("/api/preview", get(preview::enter))
        .route("/api/preview/exit", get(preview::exit))
        .route("/api/folder", post(api::create_folder))
        .route("/api/doc", post(api::create_doc))
        .route("/api/doc/:id", put(api::update_doc))
        .route("/health", get(api::health));

    Router::new()
        .merge(pages)
        .merge(api)
        .nest_service("/static", ServeDir::new(&state.static_dir))
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Start the server and block until Ctrl+C
pub async fn start(known: &Known, ip: &str, port: u16) -> Result<()> {
    let db = Database::connect(&known.config.database).await?;
    let state = AppState::new(
        db.clone(),
        known.config.clone(),
        known.resolver(),
        known.static_dir.clone(),
    )?;
    state.pages.prerender().await?;

    let app = build_router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Render a status page with the site layout
fn error_page(state: &AppState, page: &ErrorPage) -> Response {
    match state.templates.error(page.status.as_u16(), &page.message) {
        Ok(html) => (page.status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            (page.status, page.message.clone()).into_response()
        }
    }
}

/// Swap plain error bodies on page routes for rendered status pages
async fn render_error_pages(State(state): State<AppState>, response: Response) -> Response {
    if let Some(page) = response.extensions().get::<ErrorPage>().cloned() {
        return error_page(&state, &page);
    }
    response
}

async fn not_found(State(state): State<AppState>) -> Response {
    error_page(
        &state,
        &ErrorPage {
            status: StatusCode::NOT_FOUND,
            message: "Page not found".to_string(),
        },
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "An internal error occurred",
    )
        .into_response()
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::content::FallbackPolicy;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn boom() -> &'static str {
        panic!("secret detail")
    }

    #[tokio::test]
    async fn test_root_redirects_to_blog() {
        let app = test_app(SiteConfig::default(), FallbackPolicy::Placeholder).await;
        let response = app.get("/", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/blog");
    }

    #[tokio::test]
    async fn test_unknown_route_renders_404_page() {
        let app = test_app(SiteConfig::default(), FallbackPolicy::Placeholder).await;
        let response = app.get("/nope", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.contains("<h1>404</h1>"));
    }

    #[tokio::test]
    async fn test_static_files_are_served() {
        let app = test_app(SiteConfig::default(), FallbackPolicy::Placeholder).await;
        let public = app.dir.path().join("public");
        std::fs::create_dir_all(&public).unwrap();
        std::fs::write(public.join("site.css"), "body {}").unwrap();

        let response = app.get("/static/site.css", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "body {}");
    }

    #[tokio::test]
    async fn test_panics_become_generic_500() {
        let router: Router = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handle_panic));

        let response = router
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_string(response).await;
        assert_eq!(body, "An internal error occurred");
    }
}
