//! Create a new post

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

use crate::content::{FrontMatter, MatterFormat, Metadata, PostId};
use crate::Blog;

/// Create `posts/{slug}.md`, refusing to overwrite an existing post
///
/// The slug defaults to the slugified title.
pub fn create_post(blog: &Blog, title: &str, slug: Option<&str>) -> Result<PathBuf> {
    let now = chrono::Local::now();

    let slug = match slug {
        Some(s) => s.to_string(),
        None => slug::slugify(title),
    };
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}, pass --slug", title);
    }
    let id = PostId::from_file_name(&format!("{}.md", slug))
        .filter(|id| !id.file_name.contains(['/', '\\']))
        .with_context(|| format!("Invalid slug: {:?}", slug))?;

    fs::create_dir_all(&blog.posts_dir)
        .with_context(|| format!("Failed to create {:?}", blog.posts_dir))?;

    let file_path = blog.posts_dir.join(&id.file_name);
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let mut data = Metadata::new();
    data.insert("title".to_string(), Value::String(title.to_string()));
    data.insert(
        "date".to_string(),
        Value::String(now.format("%Y-%m-%d").to_string()),
    );
    data.insert("description".to_string(), Value::String(String::new()));
    let content = FrontMatter::new(MatterFormat::Yaml, data).stringify("\n")?;

    fs::write(&file_path, content)
        .with_context(|| format!("Failed to write {:?}", file_path))?;

    println!("Created: {:?}", file_path);

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PostStore;

    #[test]
    fn test_create_post() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let path = create_post(&blog, "My First Post", None).unwrap();
        assert_eq!(path, blog.posts_dir.join("my-first-post.md"));

        let post = PostStore::new(&blog.posts_dir)
            .load_post(&PostId::from_slug("my-first-post"))
            .unwrap();
        assert_eq!(post.title().as_deref(), Some("My First Post"));
        assert!(post.date().is_some());
        assert_eq!(post.description().as_deref(), Some(""));
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        create_post(&blog, "Hello", Some("greeting")).unwrap();
        let err = create_post(&blog, "Hello again", Some("greeting")).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_rejects_bad_slug() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        assert!(create_post(&blog, "!!!", None).is_err());
        assert!(create_post(&blog, "x", Some("../escape")).is_err());
        assert!(create_post(&blog, "x", Some(".hidden")).is_err());
    }
}
