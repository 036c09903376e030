//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,
    /// URL segment detail pages live under
    pub article_dir: String,

    // Directory
    /// Content store holding the markdown posts
    pub posts_dir: String,
    pub public_dir: String,
    /// Files copied verbatim into the output
    pub static_dir: String,

    // Rendering
    #[serde(default)]
    pub markdown: MarkdownConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Home page
    #[serde(default)]
    pub carousel: CarouselConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Inkpost".to_string(),
            subtitle: String::new(),
            description: String::new(),
            author: String::new(),
            language: "en".to_string(),

            url: "http://localhost".to_string(),
            root: "/".to_string(),
            article_dir: "article".to_string(),

            posts_dir: "posts".to_string(),
            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            markdown: MarkdownConfig::default(),
            highlight: HighlightConfig::default(),

            carousel: CarouselConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        // An empty file is a valid "all defaults" config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }
}

/// Markdown extensions and heading anchors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Tables, strikethrough and task lists
    pub gfm: bool,
    pub footnotes: bool,
    pub math: bool,
    pub smart_punctuation: bool,
    /// `# Heading {#id .class}` syntax
    pub heading_attributes: bool,
    /// Heading levels 1..=anchor_depth get a clickable anchor
    pub anchor_depth: u8,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            gfm: true,
            footnotes: true,
            math: false,
            smart_punctuation: false,
            heading_attributes: true,
            anchor_depth: 2,
        }
    }
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    /// Name of a syntect default theme
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Slide direction of the home page carousel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarouselDirection {
    #[default]
    Vertical,
    Horizontal,
}

/// Home page carousel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub direction: CarouselDirection,
    pub mousewheel: bool,
    /// Clickable bullets, one per slide
    pub pagination: bool,
    /// Previous / next buttons
    pub navigation: bool,
    #[serde(alias = "loop")]
    pub loop_slides: bool,
    /// Gap between slides in pixels
    pub space_between: u32,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            direction: CarouselDirection::Vertical,
            mousewheel: true,
            pagination: true,
            navigation: true,
            loop_slides: false,
            space_between: 30,
        }
    }
}
