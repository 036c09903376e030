//! Code highlighting

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::config::HighlightConfig;
use crate::error::{Error, Result};
use crate::helpers::html_escape;

/// Turns a code block in a known language into formatted HTML
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, language: &str) -> Result<String>;
}

/// Highlighter backed by syntect's bundled syntaxes and themes
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
    line_numbers: bool,
}

impl SyntectHighlighter {
    pub const DEFAULT_THEME: &'static str = "base16-ocean.dark";

    pub fn new(config: &HighlightConfig) -> Result<Self> {
        let mut theme_set = ThemeSet::load_defaults();
        let theme = match theme_set.themes.remove(&config.theme) {
            Some(theme) => theme,
            None => {
                tracing::warn!(
                    "Unknown highlight theme {:?}, using {}",
                    config.theme,
                    Self::DEFAULT_THEME
                );
                theme_set
                    .themes
                    .remove(Self::DEFAULT_THEME)
                    .ok_or_else(|| {
                        Error::Config(format!("highlight theme {:?} is unavailable", config.theme))
                    })?
            }
        };

        Ok(Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            line_numbers: config.line_number,
        })
    }

    /// Unknown languages fall back to plain text
    fn find_syntax(&self, language: &str) -> &SyntaxReference {
        self.syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    fn add_line_numbers(&self, code: &str, highlighted: &str, lang: &str) -> String {
        let line_count = code.lines().count().max(1);
        let gutter = (1..=line_count)
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight" data-language="{}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            lang, gutter, highlighted
        )
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<String> {
        let lang = html_escape(language);
        let syntax = self.find_syntax(language);

        let highlighted =
            match highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme) {
                Ok(highlighted) => highlighted,
                Err(e) => {
                    tracing::warn!("Failed to highlight {} block: {}", language, e);
                    format!(
                        r#"<pre><code class="language-{}">{}</code></pre>"#,
                        lang,
                        html_escape(code)
                    )
                }
            };

        if self.line_numbers {
            Ok(self.add_line_numbers(code, &highlighted, &lang))
        } else {
            Ok(format!(
                r#"<figure class="highlight" data-language="{}">{}</figure>"#,
                lang, highlighted
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_go() {
        let highlighter = SyntectHighlighter::new(&HighlightConfig::default()).unwrap();
        let html = highlighter
            .highlight("package main\n\nfunc main() {}", "go")
            .unwrap();
        assert!(html.starts_with(r#"<figure class="highlight" data-language="go">"#));
        assert!(html.contains("<span style="));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_unknown_language_is_plain_text() {
        let highlighter = SyntectHighlighter::new(&HighlightConfig::default()).unwrap();
        let html = highlighter.highlight("a < b", "no-such-lang").unwrap();
        assert!(html.contains(r#"data-language="no-such-lang""#));
        assert!(html.contains("&lt;"));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let config = HighlightConfig {
            theme: "does-not-exist".to_string(),
            ..Default::default()
        };
        assert!(SyntectHighlighter::new(&config).is_ok());
    }

    #[test]
    fn test_line_numbers() {
        let config = HighlightConfig {
            line_number: true,
            ..Default::default()
        };
        let highlighter = SyntectHighlighter::new(&config).unwrap();
        let html = highlighter.highlight("a\nb\nc", "rust").unwrap();
        assert!(html.contains(r#"<td class="gutter">"#));
        assert!(html.contains(r#"<span class="line-number">3</span>"#));
        assert!(!html.contains(r#"<span class="line-number">4</span>"#));
    }
}
