//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::content::FallbackPolicy;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub blog_title: String,
    pub description: String,
    pub language: String,

    // URL
    pub signin_path: String,
    /// Sign-in endpoint of the external auth provider
    pub auth_url: String,

    // Directory
    pub posts_dir: String,
    pub cms_file: String,
    pub static_dir: String,

    // Blog
    pub fallback: FallbackPolicy,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Services
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Known".to_string(),
            blog_title: "Known Blog".to_string(),
            description: String::new(),
            language: "en".to_string(),

            signin_path: "/signin".to_string(),
            auth_url: "/api/auth/signin".to_string(),

            posts_dir: "posts".to_string(),
            cms_file: "content/cms.yml".to_string(),
            static_dir: "public".to_string(),

            fallback: FallbackPolicy::Placeholder,
            highlight: HighlightConfig::default(),

            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            session: SessionConfig::default(),
            preview: PreviewConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read {:?}", path.as_ref()))?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Override file settings with environment variables.
    ///
    /// Recognized: `DATABASE_URL`, `KNOWN_HOST`, `KNOWN_PORT`, `KNOWN_PREVIEW_SECRET`.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = env::var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(host) = env::var("KNOWN_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("KNOWN_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("KNOWN_PORT is not a valid port: {}", port))?;
        }
        if let Ok(secret) = env::var("KNOWN_PREVIEW_SECRET") {
            self.preview.secret = Some(secret).filter(|s| !s.is_empty());
        }
        Ok(())
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Database pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL (e.g. "sqlite://known.db")
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Timeout for acquiring a connection (seconds)
    pub acquire_timeout_seconds: u64,

    /// Run embedded migrations on startup
    pub migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://known.db?mode=rwc".to_string(),
            max_connections: 5,
            acquire_timeout_seconds: 30,
            migrate: true,
        }
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "known.session-token".to_string(),
        }
    }
}

/// Preview mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub cookie_name: String,
    pub max_age_seconds: i64,
    /// When set, `/api/preview` requires a matching `secret` query parameter
    pub secret: Option<String>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            cookie_name: "known_preview".to_string(),
            max_age_seconds: 60 * 60,
            secret: None,
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: true,
        }
    }
}
