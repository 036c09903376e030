//! Per-kind node renderers
//!
//! A [`Components`] set maps each [`NodeKind`] to the [`NodeRenderer`] that
//! overrides its default HTML. Kinds without an entry are written by
//! pulldown-cmark's HTML writer unchanged.

use pulldown_cmark::{CowStr, Event};
use std::collections::HashMap;
use std::sync::Arc;

use super::highlight::Highlighter;
use super::nodes::{ContentNode, HeadingNode, NodeKind};
use crate::config::MarkdownConfig;
use crate::error::Result;
use crate::helpers::html_escape;

/// Renders one kind of content node to HTML
pub trait NodeRenderer: Send + Sync {
    fn render(&self, node: &ContentNode<'_>) -> Result<String>;

    /// Events written in place of the node, in the document's single writer
    /// pass. Defaults to the output of [`NodeRenderer::render`] as raw HTML.
    fn render_events<'a>(&self, node: ContentNode<'a>) -> Result<Vec<Event<'a>>> {
        Ok(vec![Event::Html(CowStr::from(self.render(&node)?))])
    }
}

/// Renderers registered by node kind
#[derive(Clone, Default)]
pub struct Components {
    renderers: HashMap<NodeKind, Arc<dyn NodeRenderer>>,
}

impl Components {
    /// An empty set: every node renders with the default writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchored headings up to `anchor_depth`, plus highlighted code blocks
    /// when a highlighter is given
    pub fn standard(config: &MarkdownConfig, highlighter: Option<Arc<dyn Highlighter>>) -> Self {
        let mut components = Self::new();
        let heading: Arc<dyn NodeRenderer> = Arc::new(AnchoredHeading);
        for depth in 1..=config.anchor_depth.min(6) {
            components.register(NodeKind::Heading(depth), heading.clone());
        }
        if let Some(highlighter) = highlighter {
            components.register(
                NodeKind::CodeBlock,
                Arc::new(HighlightedCode::new(highlighter)),
            );
        }
        components
    }

    /// Register `renderer` for `kind`, replacing any previous one
    pub fn register(&mut self, kind: NodeKind, renderer: Arc<dyn NodeRenderer>) -> &mut Self {
        self.renderers.insert(kind, renderer);
        self
    }

    pub fn with(mut self, kind: NodeKind, renderer: impl NodeRenderer + 'static) -> Self {
        self.register(kind, Arc::new(renderer));
        self
    }

    pub fn get(&self, kind: NodeKind) -> Option<&dyn NodeRenderer> {
        self.renderers.get(&kind).map(|renderer| renderer.as_ref())
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.renderers.contains_key(&kind)
    }
}

/// Heading with a clickable `#` anchor linking to itself
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchoredHeading;

impl AnchoredHeading {
    /// Opening tag with the anchor link, and the closing tag
    fn tags(heading: &HeadingNode<'_>) -> Option<(String, String)> {
        if heading.text.is_empty() || heading.target().is_empty() {
            return None;
        }

        let tag = format!("h{}", heading.depth());
        let target = html_escape(heading.target());

        let mut attributes = String::new();
        if !heading.classes.is_empty() {
            let classes: Vec<&str> = heading.classes.iter().map(|c| c.as_ref()).collect();
            attributes.push_str(&format!(r#" class="{}""#, html_escape(&classes.join(" "))));
        }
        for (name, value) in &heading.attrs {
            match value {
                Some(value) => attributes.push_str(&format!(
                    r#" {}="{}""#,
                    html_escape(name),
                    html_escape(value)
                )),
                None => attributes.push_str(&format!(" {}", html_escape(name))),
            }
        }

        Some((
            format!(
                r##"<{tag} id="{target}"{attributes}><a class="header-anchor" href="#{target}" aria-hidden="true">#</a>"##
            ),
            format!("</{tag}>\n"),
        ))
    }
}

impl NodeRenderer for AnchoredHeading {
    fn render(&self, node: &ContentNode<'_>) -> Result<String> {
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, self.render_events(node.clone())?.into_iter());
        Ok(html)
    }

    /// Inline children stay events so footnote numbering is shared with the body
    fn render_events<'a>(&self, node: ContentNode<'a>) -> Result<Vec<Event<'a>>> {
        let heading = match node {
            ContentNode::Heading(heading) => heading,
            other => return Ok(other.into_events()),
        };
        let Some((open, close)) = Self::tags(&heading) else {
            return Ok(ContentNode::Heading(heading).into_events());
        };

        let mut events = Vec::with_capacity(heading.children.len() + 2);
        events.push(Event::Html(CowStr::from(open)));
        events.extend(heading.children);
        events.push(Event::Html(CowStr::from(close)));
        Ok(events)
    }
}

/// Fenced code with a declared language goes through the highlighter,
/// anything else stays a plain `<pre><code>` block
pub struct HighlightedCode {
    highlighter: Arc<dyn Highlighter>,
}

impl HighlightedCode {
    pub fn new(highlighter: Arc<dyn Highlighter>) -> Self {
        Self { highlighter }
    }
}

impl NodeRenderer for HighlightedCode {
    fn render(&self, node: &ContentNode<'_>) -> Result<String> {
        let ContentNode::CodeBlock(block) = node else {
            return Ok(node.default_html());
        };

        match block.language.as_deref() {
            Some(language) => {
                let code = block.code.strip_suffix('\n').unwrap_or(&block.code);
                let mut html = self.highlighter.highlight(code, language)?;
                html.push('\n');
                Ok(html)
            }
            None => Ok(format!(
                "<pre><code>{}</code></pre>\n",
                html_escape(&block.code)
            )),
        }
    }
}
