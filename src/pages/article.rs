//! Detail page: one post rendered in full

use serde::Serialize;

use crate::content::markdown::OutlineEntry;
use crate::content::{MarkdownRenderer, Metadata, PostId, PostStore};
use crate::error::Result;

/// A post ready for the article template
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub slug: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub meta: Metadata,
    /// Rendered body HTML
    pub content: String,
    pub outline: Vec<OutlineEntry>,
}

/// Load and render the post stored under `slug`
///
/// Returns [`crate::Error::NotFound`] when no such post exists.
pub fn load_article(store: &PostStore, markdown: &MarkdownRenderer, slug: &str) -> Result<Article> {
    let post = store.load_post(&PostId::from_slug(slug))?;
    let rendered = markdown.render(&post.body)?;

    Ok(Article {
        title: post.title(),
        description: post.description(),
        date: post.date(),
        meta: post.meta(),
        content: rendered.html,
        outline: rendered.outline,
        slug: post.slug,
    })
}
