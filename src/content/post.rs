//! Post model

use serde_json::Value;

use super::frontmatter::{FrontMatter, Metadata};

/// A post split into front matter and body
#[derive(Debug, Clone)]
pub struct Post {
    /// Slug (file name without extension)
    pub slug: String,

    /// Metadata block from the top of the file
    pub front_matter: FrontMatter,

    /// Raw markdown after the front matter
    pub body: String,
}

impl Post {
    pub fn new(slug: String, front_matter: FrontMatter, body: String) -> Self {
        Self {
            slug,
            front_matter,
            body,
        }
    }

    /// Front-matter fields plus the derived slug, which wins over a `slug` key
    pub fn meta(&self) -> Metadata {
        let mut meta = self.front_matter.data().clone();
        meta.insert("slug".to_string(), Value::String(self.slug.clone()));
        meta
    }

    pub fn title(&self) -> Option<String> {
        self.front_matter.text("title")
    }

    pub fn description(&self) -> Option<String> {
        self.front_matter.text("description")
    }

    pub fn date(&self) -> Option<String> {
        self.front_matter.text("date")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_merges_slug() {
        let (fm, body) =
            FrontMatter::parse("---\ntitle: T\nslug: from-file\n---\nBody").unwrap();
        let post = Post::new("real-slug".to_string(), fm, body.to_string());
        let meta = post.meta();
        assert_eq!(meta.get("slug"), Some(&Value::String("real-slug".to_string())));
        assert_eq!(meta.get("title"), Some(&Value::String("T".to_string())));
        // the file's own slug key keeps its position
        assert_eq!(meta.get_index_of("slug"), Some(1));
    }

    #[test]
    fn test_accessors() {
        let (fm, body) = FrontMatter::parse("---\ntitle: T\ndate: 2023-01-01\n---\n").unwrap();
        let post = Post::new("t".to_string(), fm, body.to_string());
        assert_eq!(post.title(), Some("T".to_string()));
        assert_eq!(post.date(), Some("2023-01-01".to_string()));
        assert_eq!(post.description(), None);
    }
}
