//! Content sources - MDX files on disk and the CMS export

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{CmsSet, FrontMatter};

/// A directory of `<slug>.mdx` files
#[derive(Debug, Clone)]
pub struct PostsDir {
    dir: PathBuf,
}

/// One file read from the posts directory
#[derive(Debug, Clone)]
pub struct PostFile {
    pub path: PathBuf,
    pub raw: String,
}

impl PostFile {
    /// Front-matter of the file, with the slug defaulting to the file stem
    pub fn front_matter(&self) -> FrontMatter {
        let (mut fm, _) = FrontMatter::parse(&self.raw);
        if fm.slug.is_none() {
            tracing::debug!("No slug in {:?}, using the file name", self.path);
            fm.slug = self
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string);
        }
        fm
    }
}

impl PostsDir {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// The file whose front-matter slug is `slug`. `<slug>.mdx` is tried
    /// first, then every file in the directory. The caller validates the slug.
    pub fn find(&self, slug: &str) -> Result<Option<PostFile>> {
        match self.read(slug) {
            Ok(file) if file.front_matter().slug.as_deref() == Some(slug) => {
                return Ok(Some(file));
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read post {:?}", slug));
            }
        }

        Ok(self
            .load_all()?
            .into_iter()
            .find(|file| file.front_matter().slug.as_deref() == Some(slug)))
    }

    pub(crate) fn read(&self, slug: &str) -> io::Result<PostFile> {
        let path = self.dir.join(format!("{}.mdx", slug));
        let raw = fs::read_to_string(&path)?;
        Ok(PostFile { path, raw })
    }

    /// Read every MDX file, ordered by file name
    pub fn load_all(&self) -> Result<Vec<PostFile>> {
        if !self.dir.exists() {
            tracing::warn!("Posts directory {:?} does not exist", self.dir);
            return Ok(Vec::new());
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(&self.dir)
            .max_depth(1)
            .sort_by_file_name()
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_mdx_file(path) {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read post {:?}", path))?;
                files.push(PostFile {
                    path: path.to_path_buf(),
                    raw,
                });
            }
        }

        Ok(files)
    }
}

/// Raw MDX strings exported by the CMS
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CmsContent {
    pub draft: Vec<String>,
    pub published: Vec<String>,
}

impl CmsContent {
    /// Load the export from a YAML file with `draft` and `published` lists.
    /// A missing file means an empty CMS.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("No CMS content at {:?}", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let cms: CmsContent = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid CMS content in {:?}", path))?;
        Ok(cms)
    }

    pub fn set(&self, set: CmsSet) -> &[String] {
        match set {
            CmsSet::Draft => &self.draft,
            CmsSet::Published => &self.published,
        }
    }

    /// First entry of `set` whose front-matter slug is `slug`
    pub fn find(&self, set: CmsSet, slug: &str) -> Option<&str> {
        self.set(set)
            .iter()
            .map(String::as_str)
            .find(|raw| FrontMatter::parse(raw).0.slug.as_deref() == Some(slug))
    }
}

/// Check if a file is an MDX file
fn is_mdx_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "mdx")
        .unwrap_or(false)
}
