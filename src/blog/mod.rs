//! Pre-rendered blog pages
//!
//! Every slug enumerated by the static paths is rendered once at startup.
//! Other slugs go through the configured fallback policy: generated inline,
//! generated in the background behind a placeholder, or refused outright.
//! Preview requests never touch the store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::content::{ContentResolver, FallbackPolicy};
use crate::error::{ServerError, ServerResult};
use crate::templates::TemplateRenderer;

/// Misses remembered before the set is reset
const MAX_REMEMBERED_MISSES: usize = 1024;

/// Result of looking a slug up in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Rendered page
    Page(Arc<String>),
    /// Generation is under way
    Placeholder,
    /// No such post
    NotFound,
}

#[derive(Default)]
struct Pages {
    ready: HashMap<String, Arc<String>>,
    generating: HashSet<String>,
    missing: HashSet<String>,
}

impl Pages {
    fn lookup(&self, slug: &str) -> Option<Lookup> {
        if let Some(html) = self.ready.get(slug) {
            Some(Lookup::Page(Arc::clone(html)))
        } else if self.generating.contains(slug) {
            Some(Lookup::Placeholder)
        } else if self.missing.contains(slug) {
            Some(Lookup::NotFound)
        } else {
            None
        }
    }

    fn remember_miss(&mut self, slug: &str) {
        if self.missing.len() >= MAX_REMEMBERED_MISSES {
            self.missing.clear();
        }
        self.missing.insert(slug.to_string());
    }
}

/// Cache of rendered `/blog/:slug` pages
pub struct PageStore {
    content: Arc<ContentResolver>,
    templates: Arc<TemplateRenderer>,
    fallback: FallbackPolicy,
    pages: RwLock<Pages>,
}

impl PageStore {
    pub fn new(content: Arc<ContentResolver>, templates: Arc<TemplateRenderer>) -> Self {
        let fallback = content.fallback();
        Self {
            content,
            templates,
            fallback,
            pages: RwLock::new(Pages::default()),
        }
    }

    /// Render every enumerated slug. Returns how many pages are ready.
    pub async fn prerender(&self) -> ServerResult<usize> {
        let content = Arc::clone(&self.content);
        let paths = tokio::task::spawn_blocking(move || content.get_static_paths())
            .await
            .map_err(ServerError::internal)??;

        let mut rendered = 0;
        for slug in paths.slugs() {
            match self.generate(slug).await {
                Ok(Lookup::Page(_)) => rendered += 1,
                Ok(_) => tracing::warn!("Enumerated post {:?} did not resolve", slug),
                Err(e) => tracing::warn!("Failed to pre-render {:?}: {}", slug, e),
            }
        }

        tracing::info!("Pre-rendered {} of {} posts", rendered, paths.paths.len());
        Ok(rendered)
    }

    /// Look up a published page, applying the fallback policy on a miss
    pub async fn get(self: &Arc<Self>, slug: &str) -> ServerResult<Lookup> {
        if let Some(found) = self.pages.read().await.lookup(slug) {
            return Ok(found);
        }

        match self.fallback {
            FallbackPolicy::NotFound => Ok(Lookup::NotFound),
            FallbackPolicy::Blocking => self.generate(slug).await,
            FallbackPolicy::Placeholder => {
                {
                    let mut pages = self.pages.write().await;
                    if let Some(found) = pages.lookup(slug) {
                        return Ok(found);
                    }
                    pages.generating.insert(slug.to_string());
                }

                let store = Arc::clone(self);
                let slug = slug.to_string();
                tokio::spawn(async move {
                    if let Err(e) = store.generate(&slug).await {
                        tracing::error!("Background render of {:?} failed: {}", slug, e);
                    }
                });

                Ok(Lookup::Placeholder)
            }
        }
    }

    /// Resolve and render a slug, recording the outcome
    pub async fn generate(&self, slug: &str) -> ServerResult<Lookup> {
        let content = Arc::clone(&self.content);
        let templates = Arc::clone(&self.templates);
        let owned = slug.to_string();
        let result = tokio::task::spawn_blocking(move || {
            render_post(&content, &templates, &owned, false)
        })
        .await
        .map_err(ServerError::internal)
        .and_then(|r| r);

        let mut pages = self.pages.write().await;
        pages.generating.remove(slug);

        match result {
            Ok(html) => {
                let html = Arc::new(html);
                pages.ready.insert(slug.to_string(), Arc::clone(&html));
                Ok(Lookup::Page(html))
            }
            Err(ServerError::NotFound(_)) => {
                pages.remember_miss(slug);
                Ok(Lookup::NotFound)
            }
            Err(e) => Err(e),
        }
    }
}

/// Resolve one post and render its page
pub fn render_post(
    content: &ContentResolver,
    templates: &TemplateRenderer,
    slug: &str,
    preview: bool,
) -> ServerResult<String> {
    let post = content.get_post(slug, preview)?;
    Ok(templates.blog_post(&post, preview)?)
}
