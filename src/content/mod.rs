//! Content module - MDX posts from disk and the CMS, and their rendering

mod frontmatter;
pub mod loader;
mod markdown;
mod post;
pub mod resolver;

pub use frontmatter::FrontMatter;
pub use loader::{CmsContent, PostsDir};
pub use markdown::{hydrate, MarkdownRenderer, RenderedSource, Scope};
pub use post::{CmsSet, FallbackPolicy, PathParams, Post, Provenance, StaticPath, StaticPaths};
pub use resolver::{Attempt, ContentError, ContentResolver, LookupStep};
