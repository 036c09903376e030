//! Markdown rendering with anchored headings and syntax highlighting

mod components;
mod highlight;
mod nodes;

use pulldown_cmark::{html, Event, Options, Parser};
use serde::Serialize;
use std::sync::Arc;

pub use components::{AnchoredHeading, Components, HighlightedCode, NodeRenderer};
pub use highlight::{Highlighter, SyntectHighlighter};
pub use nodes::{
    declared_language, heading_depth, parse_nodes, CodeBlockNode, ContentNode, HeadingNode,
    NodeKind,
};

use crate::config::{HighlightConfig, MarkdownConfig};
use crate::error::Result;

/// An anchored heading, for the article outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineEntry {
    pub level: u8,
    pub text: String,
    pub anchor: String,
}

/// Rendered article body
#[derive(Debug, Clone, Serialize)]
pub struct Rendered {
    pub html: String,
    pub outline: Vec<OutlineEntry>,
}

/// Markdown renderer dispatching nodes to registered components
#[derive(Clone)]
pub struct MarkdownRenderer {
    options: Options,
    components: Components,
}

impl MarkdownRenderer {
    /// Build the standard renderer from site configuration
    pub fn new(markdown: &MarkdownConfig, highlight: &HighlightConfig) -> Result<Self> {
        let highlighter: Option<Arc<dyn Highlighter>> = if highlight.enable {
            Some(Arc::new(SyntectHighlighter::new(highlight)?))
        } else {
            None
        };
        let components = Components::standard(markdown, highlighter);
        Ok(Self::with_components(markdown, components))
    }

    /// Create with a custom component set
    pub fn with_components(markdown: &MarkdownConfig, components: Components) -> Self {
        Self {
            options: parser_options(markdown),
            components,
        }
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    /// Parse a body into content nodes
    pub fn parse<'a>(&self, markdown: &'a str) -> Vec<ContentNode<'a>> {
        parse_nodes(Parser::new_ext(markdown, self.options))
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<Rendered> {
        let nodes = self.parse(markdown);

        let mut events: Vec<Event> = Vec::with_capacity(nodes.len());
        let mut outline = Vec::new();

        for node in nodes {
            let Some(renderer) = node.kind().and_then(|kind| self.components.get(kind)) else {
                events.extend(node.into_events());
                continue;
            };

            if let ContentNode::Heading(heading) = &node {
                if !heading.text.is_empty() && !heading.target().is_empty() {
                    outline.push(OutlineEntry {
                        level: heading.depth(),
                        text: heading.text.clone(),
                        anchor: heading.target().to_string(),
                    });
                }
            }

            events.extend(renderer.render_events(node)?);
        }

        // One writer pass keeps footnote numbering and table state intact
        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(Rendered {
            html: html_output,
            outline,
        })
    }
}

fn parser_options(config: &MarkdownConfig) -> Options {
    let mut options = Options::empty();
    if config.gfm {
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_GFM);
    }
    if config.footnotes {
        options.insert(Options::ENABLE_FOOTNOTES);
    }
    if config.math {
        options.insert(Options::ENABLE_MATH);
    }
    if config.smart_punctuation {
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
    }
    if config.heading_attributes {
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    }
    options
}
