//! Built-in page templates using the Tera template engine
//!
//! The templates are embedded in the binary, so a site needs nothing but
//! `_config.yml` and a posts directory to render.

use std::collections::HashMap;
use tera::{Context, Tera};

use crate::error::Result;
use crate::helpers;

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("article.html", include_str!("site/article.html")),
            ("404.html", include_str!("site/404.html")),
            // Partials
            (
                "partials/style.html",
                include_str!("site/partials/style.html"),
            ),
            (
                "partials/carousel.html",
                include_str!("site/partials/carousel.html"),
            ),
            (
                "partials/carousel_script.html",
                include_str!("site/partials/carousel_script.html"),
            ),
            ("partials/card.html", include_str!("site/partials/card.html")),
        ])?;

        // Register custom filters
        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(helpers::strip_html(&s)))
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
        None => " .....".to_string(),
    };

    Ok(tera::Value::String(helpers::truncate(&s, length, &omission)))
}
