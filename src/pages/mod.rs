//! Page builders: loading posts and rendering them through the templates

pub mod article;
pub mod home;

pub use article::{load_article, Article};
pub use home::{load_summaries, Summary};

use chrono::Datelike;
use tera::Context;

use crate::config::SiteConfig;
use crate::content::{MarkdownRenderer, PostStore};
use crate::error::Result;
use crate::helpers::{article_dir, encode_segment, full_url_for, url_for};
use crate::templates::TemplateRenderer;
use crate::Blog;

/// Everything needed to build a page, created once and shared
pub struct PageBuilder {
    config: SiteConfig,
    store: PostStore,
    markdown: MarkdownRenderer,
    templates: TemplateRenderer,
}

impl PageBuilder {
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            markdown: MarkdownRenderer::new(&blog.config.markdown, &blog.config.highlight)?,
            templates: TemplateRenderer::new()?,
            store: PostStore::new(&blog.posts_dir),
            config: blog.config.clone(),
        })
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn store(&self) -> &PostStore {
        &self.store
    }

    /// Summaries for the home page, in loader order
    pub fn home(&self) -> Result<Vec<Summary>> {
        load_summaries(&self.store, &self.config)
    }

    pub fn article(&self, slug: &str) -> Result<Article> {
        load_article(&self.store, &self.markdown, slug)
    }

    pub fn render_home(&self) -> Result<String> {
        let summaries = self.home()?;
        let mut context = self.base_context();
        context.insert("summaries", &summaries);
        context.insert("canonical", &full_url_for(&self.config, "/"));
        self.templates.render("index.html", &context)
    }

    pub fn render_article(&self, slug: &str) -> Result<String> {
        let article = self.article(slug)?;
        let mut context = self.base_context();
        context.insert("article", &article);
        let path = format!("{}/{}/", article_dir(&self.config), encode_segment(slug));
        context.insert("canonical", &full_url_for(&self.config, &path));
        self.templates.render("article.html", &context)
    }

    /// The not-found page, naming the missing slug when there is one
    pub fn render_not_found(&self, slug: Option<&str>) -> Result<String> {
        let mut context = self.base_context();
        context.insert("slug", &slug);
        self.templates.render("404.html", &context)
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.config);
        context.insert("carousel", &self.config.carousel);
        context.insert("home_path", &url_for(&self.config, "/"));
        context.insert("current_year", &chrono::Local::now().year());
        context.insert("version", env!("CARGO_PKG_VERSION"));
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn blog_with(files: &[(&str, &str)]) -> (tempfile::TempDir, PageBuilder) {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("posts");
        fs::create_dir_all(&posts).unwrap();
        for (name, content) in files {
            fs::write(posts.join(name), content).unwrap();
        }
        let blog = Blog::new(dir.path()).unwrap();
        let builder = PageBuilder::new(&blog).unwrap();
        (dir, builder)
    }

    #[test]
    fn test_render_home_links_every_post() {
        let (_dir, builder) = blog_with(&[
            ("a.md", "---\ntitle: A\ndate: 2023-01-01\n---\nA body"),
            ("b.md", "---\ntitle: B\ndate: 2023-02-01\n---\nB body"),
        ]);
        let html = builder.render_home().unwrap();
        assert!(html.contains(r#"href="/article/a/""#));
        assert!(html.contains(r#"href="/article/b/""#));
        assert!(html.contains("PREVIEW"));
        assert!(html.contains("2023-02-01"));
        assert!(!html.contains("A body"));
    }

    #[test]
    fn test_render_article() {
        let (_dir, builder) = blog_with(&[(
            "hello.md",
            "---\ntitle: Hello <World>\n---\n# Getting Started\n\n## Next\n\nText",
        )]);
        let html = builder.render_article("hello").unwrap();
        assert!(html.contains("Hello &lt;World&gt;"));
        assert!(html.contains(r##"href="#getting-started""##));
        assert!(html.contains("On this page"));
        assert!(html.contains(r#"<link rel="canonical" href="http://localhost/article/hello/">"#));
    }

    #[test]
    fn test_render_missing_article() {
        let (_dir, builder) = blog_with(&[]);
        let err = builder.render_article("nope").unwrap_err();
        assert!(err.is_not_found());

        let html = builder.render_not_found(Some("nope")).unwrap();
        assert!(html.contains("nope"));
        let html = builder.render_not_found(None).unwrap();
        assert!(html.contains("This page does not exist."));
    }
}
