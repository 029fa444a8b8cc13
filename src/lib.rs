//! known-rs: a server-rendered notes app with an MDX blog
//!
//! The notes side is a folder/document browser backed by SQLite and gated by
//! sessions issued by an external auth provider. The blog side merges MDX
//! posts from a directory with posts from a headless CMS export.

pub mod app;
pub mod blog;
pub mod commands;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod server;
pub mod session;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::{CmsContent, ContentResolver, MarkdownRenderer, PostsDir};

/// A site rooted at a base directory
#[derive(Clone)]
pub struct Known {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// MDX posts directory
    pub posts_dir: PathBuf,
    /// CMS export file
    pub cms_file: PathBuf,
    /// Files served under /static
    pub static_dir: PathBuf,
}

impl Known {
    /// Load `_config.yml` from `base_dir` (defaults if absent), then the environment
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env()?;

        let posts_dir = base_dir.join(&config.posts_dir);
        let cms_file = base_dir.join(&config.cms_file);
        let static_dir = base_dir.join(&config.static_dir);

        Ok(Self {
            config,
            base_dir,
            posts_dir,
            cms_file,
            static_dir,
        })
    }

    /// Content resolver over this site's posts directory and CMS export.
    /// An unreadable CMS export is logged and treated as empty.
    pub fn resolver(&self) -> ContentResolver {
        let cms = CmsContent::load(&self.cms_file).unwrap_or_else(|e| {
            tracing::warn!("Ignoring CMS content: {:#}", e);
            CmsContent::default()
        });
        let highlight = &self.config.highlight;

        ContentResolver::new(
            PostsDir::new(&self.posts_dir),
            cms,
            MarkdownRenderer::with_options(&highlight.theme, highlight.line_number),
            self.config.fallback,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_new_without_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let known = Known::new(dir.path()).unwrap();
        assert_eq!(known.posts_dir, dir.path().join("posts"));
        assert_eq!(known.cms_file, dir.path().join("content/cms.yml"));
    }

    #[test]
    fn test_resolver_reads_site_content() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_config.yml"), "posts_dir: articles\n").unwrap();
        fs::create_dir_all(dir.path().join("articles")).unwrap();
        fs::write(
            dir.path().join("articles/first.mdx"),
            "---\nslug: first\ntitle: First\n---\nbody",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("content")).unwrap();
        fs::write(
            dir.path().join("content/cms.yml"),
            "published:\n  - \"---\\nslug: cms\\n---\\nfrom cms\"\n",
        )
        .unwrap();

        let resolver = Known::new(dir.path()).unwrap().resolver();
        let slugs: Vec<_> = resolver
            .get_posts()
            .unwrap()
            .into_iter()
            .filter_map(|fm| fm.slug)
            .collect();
        assert_eq!(slugs, vec!["cms", "first"]);
    }
}
