//! Home page: one summary card per post

use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::{Metadata, PostStore};
use crate::error::Result;
use crate::helpers::article_path;

/// What a carousel card shows for one post
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub slug: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    /// Path of the detail page
    pub href: String,
    /// All front-matter fields plus the slug
    pub meta: Metadata,
}

/// Load a summary for every post, in loader order
pub fn load_summaries(store: &PostStore, config: &SiteConfig) -> Result<Vec<Summary>> {
    let ids = store.list_post_identifiers()?;
    let mut summaries = Vec::with_capacity(ids.len());

    for id in &ids {
        // The body is not needed for a card
        let post = store.load_post(id)?;
        summaries.push(Summary {
            title: post.title(),
            description: post.description(),
            date: post.date(),
            href: article_path(config, &post.slug),
            meta: post.meta(),
            slug: post.slug,
        });
    }

    tracing::debug!("Loaded {} summaries from {:?}", summaries.len(), store.root());
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::fs;

    #[test]
    fn test_two_posts_in_loader_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.md"),
            "---\ntitle: A\ndate: 2023-01-01\n---\nBody of A",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.md"),
            "---\ntitle: B\ndate: 2023-02-01\n---\nBody of B",
        )
        .unwrap();
        let store = PostStore::new(dir.path());

        let summaries = load_summaries(&store, &SiteConfig::default()).unwrap();
        let loader_order: Vec<String> = store
            .list_post_identifiers()
            .unwrap()
            .into_iter()
            .map(|id| id.slug)
            .collect();
        let slugs: Vec<String> = summaries.iter().map(|s| s.slug.clone()).collect();
        assert_eq!(slugs, loader_order);

        let mut sorted = slugs.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["a", "b"]);

        let a = summaries.iter().find(|s| s.slug == "a").unwrap();
        assert_eq!(a.title.as_deref(), Some("A"));
        assert_eq!(a.date.as_deref(), Some("2023-01-01"));
        assert_eq!(a.href, "/article/a/");
        assert_eq!(a.meta.get("slug"), Some(&Value::String("a".to_string())));
        let b = summaries.iter().find(|s| s.slug == "b").unwrap();
        assert_eq!(b.title.as_deref(), Some("B"));
        assert_eq!(b.date.as_deref(), Some("2023-02-01"));
    }

    #[test]
    fn test_post_without_front_matter() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bare.md"), "# Just a body\n").unwrap();
        let store = PostStore::new(dir.path());

        let summaries = load_summaries(&store, &SiteConfig::default()).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].slug, "bare");
        assert_eq!(summaries[0].title, None);
        assert_eq!(summaries[0].meta.len(), 1);
    }

    #[test]
    fn test_malformed_front_matter_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.md"), "---\ntitle: [unclosed\n---\n").unwrap();
        let store = PostStore::new(dir.path());

        let err = load_summaries(&store, &SiteConfig::default()).unwrap_err();
        assert!(matches!(err, crate::Error::Parse { .. }));
    }

    #[test]
    fn test_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PostStore::new(dir.path().join("nope"));
        assert!(load_summaries(&store, &SiteConfig::default())
            .unwrap()
            .is_empty());
    }
}
