//! Blog content resolution across the posts directory and the CMS
//!
//! A single post is looked up through an ordered fallback chain: the
//! filesystem first, then the CMS set selected by preview mode. Every failed
//! step is kept so a miss can explain itself. Listing merges both sources,
//! CMS first, and a filesystem post shadows a CMS entry with the same slug.

use std::collections::HashSet;
use std::fmt;

use super::loader::{CmsContent, PostsDir};
use super::{
    CmsSet, FallbackPolicy, FrontMatter, MarkdownRenderer, Post, Provenance, StaticPath,
    StaticPaths,
};

/// A step of the single-post fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStep {
    Filesystem,
    Cms(CmsSet),
}

impl fmt::Display for LookupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStep::Filesystem => write!(f, "filesystem"),
            LookupStep::Cms(set) => write!(f, "cms/{}", set),
        }
    }
}

/// Why a step of the chain produced nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub step: LookupStep,
    pub reason: String,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step, self.reason)
    }
}

/// Errors from content resolution
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("no post with slug {slug:?} ({})", format_attempts(.attempts))]
    NotFound { slug: String, attempts: Vec<Attempt> },

    #[error("invalid slug {0:?}")]
    InvalidSlug(String),

    #[error("failed to render post {slug:?}: {source}")]
    Render {
        slug: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Load(#[from] anyhow::Error),
}

fn format_attempts(attempts: &[Attempt]) -> String {
    attempts
        .iter()
        .map(Attempt::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Resolves blog posts from both content sources
pub struct ContentResolver {
    posts: PostsDir,
    cms: CmsContent,
    renderer: MarkdownRenderer,
    fallback: FallbackPolicy,
}

impl ContentResolver {
    pub fn new(
        posts: PostsDir,
        cms: CmsContent,
        renderer: MarkdownRenderer,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            posts,
            cms,
            renderer,
            fallback,
        }
    }

    pub fn fallback(&self) -> FallbackPolicy {
        self.fallback
    }

    /// Resolve and render one post
    pub fn get_post(&self, slug: &str, preview: bool) -> Result<Post, ContentError> {
        validate_slug(slug)?;

        let (raw, provenance) = self.read_raw(slug, preview)?;
        let (front_matter, body) = FrontMatter::parse(&raw);
        let source = self
            .renderer
            .render_to_string(body, front_matter.to_scope())
            .map_err(|source| ContentError::Render {
                slug: slug.to_string(),
                source,
            })?;

        tracing::debug!("Resolved post {:?} from {:?}", slug, provenance);

        Ok(Post {
            slug: slug.to_string(),
            front_matter,
            source,
            provenance,
        })
    }

    /// Walk the fallback chain until a source has the slug
    fn read_raw(&self, slug: &str, preview: bool) -> Result<(String, Provenance), ContentError> {
        let mut attempts = Vec::new();

        match self.posts.find(slug) {
            Ok(Some(file)) => {
                return Ok((file.raw, Provenance::Filesystem { path: file.path }));
            }
            Ok(None) => attempts.push(Attempt {
                step: LookupStep::Filesystem,
                reason: "no file with that slug".to_string(),
            }),
            Err(e) => {
                tracing::warn!("Reading post {:?} from disk failed: {:#}", slug, e);
                attempts.push(Attempt {
                    step: LookupStep::Filesystem,
                    reason: format!("{:#}", e),
                });
            }
        }

        let set = CmsSet::for_preview(preview);
        match self.cms.find(set, slug) {
            Some(raw) => return Ok((raw.to_string(), Provenance::Cms { set })),
            None => attempts.push(Attempt {
                step: LookupStep::Cms(set),
                reason: format!("no entry among {} {} posts", self.cms.set(set).len(), set),
            }),
        }

        Err(ContentError::NotFound {
            slug: slug.to_string(),
            attempts,
        })
    }

    /// Front-matter of every listed post: published CMS entries, then files.
    /// A CMS entry whose slug also exists on disk is left out.
    pub fn get_posts(&self) -> Result<Vec<FrontMatter>, ContentError> {
        let files: Vec<FrontMatter> = self
            .posts
            .load_all()?
            .iter()
            .map(|file| file.front_matter())
            .collect();

        let on_disk: HashSet<&str> = files.iter().filter_map(|fm| fm.slug.as_deref()).collect();

        let mut posts: Vec<FrontMatter> = Vec::with_capacity(self.cms.published.len() + files.len());
        for raw in &self.cms.published {
            let (fm, _) = FrontMatter::parse(raw);
            if let Some(slug) = fm.slug.as_deref() {
                if on_disk.contains(slug) {
                    tracing::debug!("CMS post {:?} is shadowed by a file", slug);
                    continue;
                }
            }
            posts.push(fm);
        }
        posts.extend(files.iter().cloned());

        Ok(posts)
    }

    /// Slugs of every file on disk, with the configured fallback policy
    pub fn get_static_paths(&self) -> Result<StaticPaths, ContentError> {
        let paths = self
            .posts
            .load_all()?
            .iter()
            .filter_map(|file| file.front_matter().slug)
            .map(StaticPath::new)
            .collect();

        Ok(StaticPaths {
            paths,
            fallback: self.fallback,
        })
    }
}

/// Slugs name a file directly under the posts directory
fn validate_slug(slug: &str) -> Result<(), ContentError> {
    let valid = !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(ContentError::InvalidSlug(slug.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn cms(draft: &[&str], published: &[&str]) -> CmsContent {
        CmsContent {
            draft: draft.iter().map(|s| s.to_string()).collect(),
            published: published.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn resolver(dir: &TempDir, cms: CmsContent) -> ContentResolver {
        ContentResolver::new(
            PostsDir::new(dir.path()),
            cms,
            MarkdownRenderer::new(),
            FallbackPolicy::Placeholder,
        )
    }

    fn hello_site() -> (TempDir, ContentResolver) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("hello.mdx"),
            "---\nslug: hello\ntitle: \"Hello\"\nsummary: hi\n---\n# {title}\n",
        )
        .unwrap();
        let cms = cms(
            &["---\nslug: wip\ntitle: WIP\n---\nnot yet"],
            &["---\nslug: other\ntitle: Other\n---\nfrom the cms"],
        );
        let resolver = resolver(&dir, cms);
        (dir, resolver)
    }

    #[test]
    fn test_static_paths_list_files_only() {
        let (_dir, resolver) = hello_site();
        let paths = resolver.get_static_paths().unwrap();
        assert_eq!(paths.paths, vec![StaticPath::new("hello")]);
        assert_eq!(paths.fallback, FallbackPolicy::Placeholder);
        assert_eq!(
            serde_json::to_value(&paths).unwrap(),
            serde_json::json!({
                "paths": [{ "params": { "slug": "hello" } }],
                "fallback": true
            })
        );
    }

    #[test]
    fn test_get_post_from_file() {
        let (_dir, resolver) = hello_site();
        let post = resolver.get_post("hello", false).unwrap();
        assert!(matches!(post.provenance, Provenance::Filesystem { .. }));
        assert_eq!(post.front_matter.title.as_deref(), Some("Hello"));
        assert!(post.source.compiled_source.contains("<h1>Hello</h1>"));
        assert_eq!(post.source.scope["slug"], "hello");
    }

    #[test]
    fn test_get_post_falls_back_to_published_cms() {
        let (_dir, resolver) = hello_site();
        let post = resolver.get_post("other", false).unwrap();
        assert_eq!(
            post.provenance,
            Provenance::Cms {
                set: CmsSet::Published
            }
        );
        assert!(post.source.compiled_source.contains("from the cms"));
    }

    #[test]
    fn test_preview_only_reads_drafts() {
        let (_dir, resolver) = hello_site();

        let err = resolver.get_post("other", true).unwrap_err();
        match err {
            ContentError::NotFound { slug, attempts } => {
                assert_eq!(slug, "other");
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[0].step, LookupStep::Filesystem);
                assert_eq!(attempts[1].step, LookupStep::Cms(CmsSet::Draft));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }

        let draft = resolver.get_post("wip", true).unwrap();
        assert_eq!(draft.provenance, Provenance::Cms { set: CmsSet::Draft });
        assert!(resolver.get_post("wip", false).is_err());
    }

    #[test]
    fn test_file_wins_over_cms_in_preview() {
        let (_dir, resolver) = hello_site();
        let post = resolver.get_post("hello", true).unwrap();
        assert!(matches!(post.provenance, Provenance::Filesystem { .. }));
    }

    #[test]
    fn test_missing_post_is_not_found() {
        let (_dir, resolver) = hello_site();
        let err = resolver.get_post("missing", false).unwrap_err();
        assert!(matches!(err, ContentError::NotFound { .. }));
        assert!(err.to_string().contains("cms/published"));
    }

    #[test]
    fn test_traversal_slugs_rejected() {
        let (_dir, resolver) = hello_site();
        for slug in ["", "..", "../secret", "a/b", "a\\b"] {
            assert!(matches!(
                resolver.get_post(slug, false),
                Err(ContentError::InvalidSlug(_))
            ));
        }
    }

    #[test]
    fn test_get_posts_cms_first_then_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.mdx"), "---\nslug: a\n---\n").unwrap();
        fs::write(dir.path().join("b.mdx"), "---\nslug: b\n---\n").unwrap();
        let resolver = resolver(
            &dir,
            cms(
                &["---\nslug: d\n---\n"],
                &["---\nslug: y\n---\n", "---\nslug: x\n---\n"],
            ),
        );

        let first = resolver.get_posts().unwrap();
        let slugs: Vec<_> = first.iter().map(|p| p.slug.clone().unwrap()).collect();
        assert_eq!(slugs, vec!["y", "x", "a", "b"]);
        assert_eq!(first.len(), 2 + 2);
        assert_eq!(resolver.get_posts().unwrap(), first);
    }

    #[test]
    fn test_get_posts_file_shadows_cms_slug() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.mdx"), "---\nslug: a\ntitle: Disk\n---\n").unwrap();
        let resolver = resolver(
            &dir,
            cms(&[], &["---\nslug: a\ntitle: Cms\n---\n", "---\nslug: z\n---\n"]),
        );

        let posts = resolver.get_posts().unwrap();
        let titles: Vec<_> = posts.iter().map(|p| p.slug.clone().unwrap()).collect();
        assert_eq!(titles, vec!["z", "a"]);
        assert_eq!(posts[1].title.as_deref(), Some("Disk"));
    }

    #[test]
    fn test_file_slug_differs_from_name() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("hello.mdx"),
            "---\nslug: greeting\ntitle: Disk\n---\nfrom disk",
        )
        .unwrap();
        let resolver = resolver(&dir, cms(&[], &["---\nslug: greeting\ntitle: Cms\n---\n"]));

        let posts = resolver.get_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title.as_deref(), Some("Disk"));

        let paths = resolver.get_static_paths().unwrap();
        assert_eq!(paths.paths, vec![StaticPath::new("greeting")]);

        for preview in [false, true] {
            let post = resolver.get_post("greeting", preview).unwrap();
            assert!(matches!(post.provenance, Provenance::Filesystem { .. }));
            assert_eq!(post.front_matter.title.as_deref(), Some("Disk"));
        }
        assert!(matches!(
            resolver.get_post("hello", false),
            Err(ContentError::NotFound { .. })
        ));
    }
}
