//! Built-in page templates using the Tera template engine
//!
//! All templates are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::app::{AppProps, View};
use crate::config::SiteConfig;
use crate::content::{hydrate, FrontMatter, Post};

/// Template renderer with the embedded page templates
pub struct TemplateRenderer {
    tera: Tera,
    config: ConfigData,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("known/layout.html")),
            ("blog_index.html", include_str!("known/blog_index.html")),
            ("blog_post.html", include_str!("known/blog_post.html")),
            ("placeholder.html", include_str!("known/placeholder.html")),
            ("app.html", include_str!("known/app.html")),
            ("signin.html", include_str!("known/signin.html")),
            ("signin_prompt.html", include_str!("known/signin_prompt.html")),
            ("error.html", include_str!("known/error.html")),
            // Partials
            ("partials/nav.html", include_str!("known/partials/nav.html")),
            (
                "partials/preview.html",
                include_str!("known/partials/preview.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self {
            tera,
            config: ConfigData::from(config),
        })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String, tera::Error> {
        self.tera.render(template_name, context)
    }

    fn context(&self) -> Context {
        let mut context = Context::new();
        context.insert("config", &self.config);
        context
    }

    /// The `/blog` listing
    pub fn blog_index(&self, posts: &[FrontMatter], preview: bool) -> Result<String, tera::Error> {
        let posts: Vec<PostData> = posts.iter().map(PostData::from).collect();
        let mut context = self.context();
        context.insert("posts", &posts);
        context.insert("preview", &preview);
        context.insert("current_path", "/blog");
        self.render("blog_index.html", &context)
    }

    /// A single `/blog/:slug` page
    pub fn blog_post(&self, post: &Post, preview: bool) -> Result<String, tera::Error> {
        let mut data = PostData::from(&post.front_matter);
        data.slug = Some(post.slug.clone());
        data.content = hydrate(&post.source).to_string();

        let mut context = self.context();
        context.insert("post", &data);
        context.insert("preview", &preview);
        context.insert("current_path", &format!("/blog/{}", post.slug));
        self.render("blog_post.html", &context)
    }

    /// Shown while an unknown slug is generated
    pub fn placeholder(&self) -> Result<String, tera::Error> {
        self.render("placeholder.html", &self.context())
    }

    /// The `/app` browser, or the sign-in prompt when signed out
    pub fn app(&self, props: &AppProps) -> Result<String, tera::Error> {
        let Some(session) = props.session() else {
            return self.render("signin_prompt.html", &self.context());
        };

        let mut context = self.context();
        context.insert("folders", props.folders());
        context.insert(
            "user_label",
            session
                .user
                .name
                .as_deref()
                .or(session.user.email.as_deref())
                .unwrap_or(""),
        );

        let none: Option<()> = None;
        match props.view() {
            View::Document { folder, doc } => {
                context.insert("view", "document");
                context.insert("folder", folder);
                context.insert("doc", doc);
                context.insert("doc_content", doc.content.as_deref().unwrap_or(""));
                context.insert("docs", &none);
            }
            View::Folder { folder, docs } => {
                context.insert("view", "folder");
                context.insert("folder", folder);
                context.insert("docs", docs);
                context.insert("doc", &none);
            }
            View::Empty | View::SignIn => {
                context.insert("view", "empty");
                context.insert("folder", &none);
                context.insert("docs", &none);
                context.insert("doc", &none);
            }
        }

        self.render("app.html", &context)
    }

    /// The sign-in landing page
    pub fn signin(&self) -> Result<String, tera::Error> {
        self.render("signin.html", &self.context())
    }

    /// A generic status page
    pub fn error(&self, status: u16, message: &str) -> Result<String, tera::Error> {
        let mut context = self.context();
        context.insert("status", &status);
        context.insert("message", message);
        self.render("error.html", &context)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "…".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: format a front-matter date string
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };

    let fm = FrontMatter {
        published_on: Some(s.clone()),
        ..Default::default()
    };
    let Some(date) = fm.parse_published_on() else {
        // Free-form dates are shown as written
        return Ok(tera::Value::String(s));
    };

    let formatted = match format.as_str() {
        "LL" => date.format("%B %d, %Y").to_string(),
        _ => date.format("%Y-%m-%d").to_string(),
    };
    Ok(tera::Value::String(formatted))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub blog_title: String,
    pub description: String,
    pub language: String,
    pub signin_path: String,
    pub auth_url: String,
}

impl From<&SiteConfig> for ConfigData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            blog_title: config.blog_title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            signin_path: config.signin_path.clone(),
            auth_url: config.auth_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub slug: Option<String>,
    pub title: String,
    pub summary: String,
    pub published_on: Option<String>,
    pub content: String,
}

impl From<&FrontMatter> for PostData {
    fn from(fm: &FrontMatter) -> Self {
        Self {
            slug: fm.slug.clone(),
            title: fm.title_or_default().to_string(),
            summary: fm.summary.clone().unwrap_or_default(),
            published_on: fm.published_on.clone(),
            content: String::new(),
        }
    }
}
