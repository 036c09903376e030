//! Generator module - writes the static site using the built-in templates

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::helpers::article_dir;
use crate::pages::PageBuilder;
use crate::Blog;

/// What a generation run produced
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Pages written, relative to the public directory
    pub pages: Vec<PathBuf>,
    /// Static files copied
    pub assets: usize,
    /// Pages that failed to build, with the reason
    pub failures: Vec<(String, String)>,
}

impl GenerateReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Static site generator
pub struct Generator {
    blog: Blog,
    pages: PageBuilder,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        let pages = PageBuilder::new(blog).context("Failed to set up page rendering")?;
        Ok(Self {
            blog: blog.clone(),
            pages,
        })
    }

    /// Generate the entire site
    ///
    /// A page that fails to build is logged and skipped so the others still
    /// get written; the run then fails with a summary of what went wrong.
    pub fn generate(&self) -> Result<GenerateReport> {
        let mut report = GenerateReport::default();

        fs::create_dir_all(&self.blog.public_dir)
            .with_context(|| format!("Failed to create {:?}", self.blog.public_dir))?;

        report.assets = self.copy_static_assets()?;

        // Home page
        match self.pages.render_home() {
            Ok(html) => report.pages.push(self.write_page(Path::new("index.html"), &html)?),
            Err(e) => {
                tracing::error!("Failed to build home page: {}", e);
                report.failures.push(("index".to_string(), e.to_string()));
            }
        }

        // Article pages
        let ids = self
            .pages
            .store()
            .list_post_identifiers()
            .context("Failed to list posts")?;
        let dir = article_dir(self.pages.config());
        for id in &ids {
            match self.pages.render_article(&id.slug) {
                Ok(html) => {
                    let path = Path::new(dir).join(&id.slug).join("index.html");
                    report.pages.push(self.write_page(&path, &html)?);
                }
                Err(e) => {
                    tracing::error!("Failed to build article {:?}: {}", id.slug, e);
                    report.failures.push((id.slug.clone(), e.to_string()));
                }
            }
        }

        // Not-found page
        let html = self
            .pages
            .render_not_found(None)
            .context("Failed to build 404 page")?;
        report.pages.push(self.write_page(Path::new("404.html"), &html)?);

        if !report.is_success() {
            let names: Vec<&str> = report.failures.iter().map(|(n, _)| n.as_str()).collect();
            anyhow::bail!(
                "{} page(s) failed to build: {}",
                report.failures.len(),
                names.join(", ")
            );
        }

        Ok(report)
    }

    /// Write one page below the public directory
    fn write_page(&self, relative: &Path, html: &str) -> Result<PathBuf> {
        let output_path = self.blog.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir {:?}", parent))?;
        }
        fs::write(&output_path, html)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(relative.to_path_buf())
    }

    /// Copy the static directory into the public directory as is
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir).follow_links(true) {
            let entry = entry.with_context(|| format!("Failed to walk {:?}", static_dir))?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest).with_context(|| format!("Failed to copy {:?}", path))?;
            copied += 1;
        }

        tracing::debug!("Copied {} static files", copied);
        Ok(copied)
    }
}
