//! Create a new MDX post

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::content::FrontMatter;
use crate::Known;

/// Write `<posts_dir>/<slug>.mdx` with front-matter for `title`
pub fn create_post(known: &Known, title: &str, slug: Option<&str>) -> Result<PathBuf> {
    let slug = match slug {
        Some(s) => slug::slugify(s),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a slug from {:?}", title);
    }

    fs::create_dir_all(&known.posts_dir)
        .with_context(|| format!("Failed to create {:?}", known.posts_dir))?;

    let file_path = known.posts_dir.join(format!("{}.mdx", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let front_matter = FrontMatter {
        slug: Some(slug),
        title: Some(title.to_string()),
        summary: Some(String::new()),
        published_on: Some(chrono::Local::now().format("%Y-%m-%d").to_string()),
        ..Default::default()
    };
    let yaml = serde_yaml::to_string(&front_matter)?;
    let content = format!("---\n{}---\n\n# {{title}}\n", yaml);

    fs::write(&file_path, content)?;
    println!("Created: {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PostsDir;
    use tempfile::TempDir;

    #[test]
    fn test_create_post_round_trips_front_matter() {
        let dir = TempDir::new().unwrap();
        let known = Known::new(dir.path()).unwrap();

        let path = create_post(&known, "Hello: World", None).unwrap();
        assert_eq!(path, dir.path().join("posts/hello-world.mdx"));

        let file = PostsDir::new(&known.posts_dir).read("hello-world").unwrap();
        let fm = file.front_matter();
        assert_eq!(fm.slug.as_deref(), Some("hello-world"));
        assert_eq!(fm.title.as_deref(), Some("Hello: World"));
        assert!(fm.parse_published_on().is_some());
    }

    #[test]
    fn test_create_post_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let known = Known::new(dir.path()).unwrap();
        create_post(&known, "Same", None).unwrap();
        assert!(create_post(&known, "Other title", Some("same")).is_err());
    }
}
