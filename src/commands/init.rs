//! Initialize a new blog

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# Site
title: Inkpost
subtitle: ''
description: ''
author: ''
language: en

# URL
url: http://localhost
root: /
article_dir: article

# Directory
posts_dir: posts
public_dir: public
static_dir: static

# Rendering
markdown:
  gfm: true
  footnotes: true
  math: false
  smart_punctuation: false
  heading_attributes: true
  anchor_depth: 2
highlight:
  enable: true
  theme: base16-ocean.dark
  line_number: false

# Home page
carousel:
  direction: vertical
  mousewheel: true
  pagination: true
  navigation: true
  loop: false
  space_between: 30
"#;

/// Initialize a new blog in the given directory
///
/// Existing files are left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("posts"))
        .with_context(|| format!("Failed to create {:?}", target_dir))?;
    fs::create_dir_all(target_dir.join("static"))?;

    write_if_missing(&target_dir.join(CONFIG_FILE), DEFAULT_CONFIG)?;

    let sample_post = format!(
        r#"---
title: Hello World
date: {}
description: Your very first post.
---

Welcome to your new blog! Every markdown file in `posts/` becomes an article.

# Quick Start

## Create a new post

```bash
$ inkpost new "My New Post"
```

## Run server

```bash
$ inkpost server
```

## Generate static files

```bash
$ inkpost generate
```
"#,
        chrono::Local::now().format("%Y-%m-%d")
    );
    write_if_missing(&target_dir.join("posts/hello-world.md"), &sample_post)?;

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        tracing::info!("Keeping existing {:?}", path);
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::debug!("Created: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::PostStore;

    #[test]
    fn test_init_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        let config = SiteConfig::load(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.posts_dir, "posts");
        assert!(!config.carousel.loop_slides);
        assert!(dir.path().join("static").is_dir());

        let store = PostStore::new(dir.path().join("posts"));
        let ids = store.list_post_identifiers().unwrap();
        assert_eq!(ids.len(), 1);
        let post = store.load_post(&ids[0]).unwrap();
        assert_eq!(post.title().as_deref(), Some("Hello World"));
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "title: Mine\n").unwrap();
        init_site(dir.path()).unwrap();
        let config = SiteConfig::load(dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.title, "Mine");
    }
}
