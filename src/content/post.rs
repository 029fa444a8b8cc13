//! Post models

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

use super::{FrontMatter, RenderedSource};

/// Which CMS set a post came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CmsSet {
    Draft,
    Published,
}

impl CmsSet {
    /// The set consulted for a request in or out of preview mode
    pub fn for_preview(preview: bool) -> Self {
        if preview {
            CmsSet::Draft
        } else {
            CmsSet::Published
        }
    }
}

impl fmt::Display for CmsSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmsSet::Draft => write!(f, "draft"),
            CmsSet::Published => write!(f, "published"),
        }
    }
}

/// Where a post's raw content was read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Provenance {
    Filesystem { path: PathBuf },
    Cms { set: CmsSet },
}

/// A fully resolved blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Requested slug
    pub slug: String,

    /// Parsed front-matter
    #[serde(rename = "frontMatter")]
    pub front_matter: FrontMatter,

    /// Rendered body, scoped with the front-matter
    pub source: RenderedSource,

    /// Source of the raw content
    pub provenance: Provenance,
}

/// Policy for slugs that were not enumerated ahead of time.
///
/// Serialized as `true` (placeholder), `false` (not found) or `"blocking"`.
/// The names `placeholder` and `not_found` are accepted as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Generate inline before answering
    Blocking,
    /// Answer a loading placeholder while generating
    #[default]
    Placeholder,
    /// Unknown slugs are a 404
    NotFound,
}

impl Serialize for FallbackPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FallbackPolicy::Blocking => serializer.serialize_str("blocking"),
            FallbackPolicy::Placeholder => serializer.serialize_bool(true),
            FallbackPolicy::NotFound => serializer.serialize_bool(false),
        }
    }
}

impl<'de> Deserialize<'de> for FallbackPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Flag(true) => Ok(FallbackPolicy::Placeholder),
            Repr::Flag(false) => Ok(FallbackPolicy::NotFound),
            Repr::Name(name) => match name.as_str() {
                "blocking" => Ok(FallbackPolicy::Blocking),
                "placeholder" => Ok(FallbackPolicy::Placeholder),
                "not_found" => Ok(FallbackPolicy::NotFound),
                other => Err(de::Error::unknown_variant(
                    other,
                    &["blocking", "placeholder", "not_found"],
                )),
            },
        }
    }
}

/// Route parameters of a pre-rendered post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathParams {
    pub slug: String,
}

/// One pre-rendered path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticPath {
    pub params: PathParams,
}

impl StaticPath {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            params: PathParams { slug: slug.into() },
        }
    }
}

/// Every path known ahead of time plus the policy for the rest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticPaths {
    pub paths: Vec<StaticPath>,
    pub fallback: FallbackPolicy,
}

impl StaticPaths {
    /// Slugs in enumeration order
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(|p| p.params.slug.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_policy_serde() {
        assert_eq!(serde_json::to_value(FallbackPolicy::Placeholder).unwrap(), true);
        assert_eq!(serde_json::to_value(FallbackPolicy::NotFound).unwrap(), false);
        assert_eq!(
            serde_json::to_value(FallbackPolicy::Blocking).unwrap(),
            "blocking"
        );

        let parse = |yaml: &str| serde_yaml::from_str::<FallbackPolicy>(yaml).unwrap();
        assert_eq!(parse("true"), FallbackPolicy::Placeholder);
        assert_eq!(parse("false"), FallbackPolicy::NotFound);
        assert_eq!(parse("blocking"), FallbackPolicy::Blocking);
        assert_eq!(parse("not_found"), FallbackPolicy::NotFound);
        assert!(serde_yaml::from_str::<FallbackPolicy>("sometimes").is_err());
    }
}
