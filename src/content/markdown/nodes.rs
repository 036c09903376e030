//! Content nodes: pulldown-cmark events grouped into headings, code blocks and markup

use lazy_static::lazy_static;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Tag, TagEnd};
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    /// Language token at the start of a fenced code block's info string
    static ref LANGUAGE: Regex = Regex::new(r"^\s*([\w#+.-]+)").unwrap();
}

/// Tag a node renderer is registered under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Heading of the given depth (1 = most significant)
    Heading(u8),
    CodeBlock,
}

/// A heading with its inline children
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingNode<'a> {
    pub level: HeadingLevel,
    /// Plain text of the heading
    pub text: String,
    /// Anchor generated from the text, unique within the document
    pub anchor: String,
    /// Explicit `{#id}` attribute
    pub id: Option<CowStr<'a>>,
    pub classes: Vec<CowStr<'a>>,
    pub attrs: Vec<(CowStr<'a>, Option<CowStr<'a>>)>,
    pub children: Vec<Event<'a>>,
}

impl HeadingNode<'_> {
    pub fn depth(&self) -> u8 {
        heading_depth(self.level)
    }

    /// Link target: the explicit id if given, else the generated anchor
    pub fn target(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.anchor)
    }
}

/// A fenced or indented code block
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlockNode {
    /// Full info string after the opening fence
    pub info: String,
    /// Declared language, the first word of the info string
    pub language: Option<String>,
    pub code: String,
    pub fenced: bool,
}

/// A structured unit of an article body
#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode<'a> {
    Heading(HeadingNode<'a>),
    CodeBlock(CodeBlockNode),
    /// Any other event, left to the default HTML writer
    Markup(Event<'a>),
}

impl<'a> ContentNode<'a> {
    /// Registry tag of this node, `None` for plain markup
    pub fn kind(&self) -> Option<NodeKind> {
        match self {
            ContentNode::Heading(heading) => Some(NodeKind::Heading(heading.depth())),
            ContentNode::CodeBlock(_) => Some(NodeKind::CodeBlock),
            ContentNode::Markup(_) => None,
        }
    }

    /// Turn the node back into the events it was built from
    pub fn into_events(self) -> Vec<Event<'a>> {
        match self {
            ContentNode::Heading(heading) => {
                let level = heading.level;
                let mut events = Vec::with_capacity(heading.children.len() + 2);
                events.push(Event::Start(Tag::Heading {
                    level,
                    id: heading.id,
                    classes: heading.classes,
                    attrs: heading.attrs,
                }));
                events.extend(heading.children);
                events.push(Event::End(TagEnd::Heading(level)));
                events
            }
            ContentNode::CodeBlock(block) => {
                let kind = if block.fenced {
                    CodeBlockKind::Fenced(CowStr::from(block.info))
                } else {
                    CodeBlockKind::Indented
                };
                let mut events = vec![Event::Start(Tag::CodeBlock(kind))];
                if !block.code.is_empty() {
                    events.push(Event::Text(CowStr::from(block.code)));
                }
                events.push(Event::End(TagEnd::CodeBlock));
                events
            }
            ContentNode::Markup(event) => vec![event],
        }
    }

    /// HTML the default writer produces for this node alone
    pub fn default_html(&self) -> String {
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, self.clone().into_events().into_iter());
        html
    }
}

pub fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Group a markdown event stream into content nodes
pub fn parse_nodes<'a, I>(events: I) -> Vec<ContentNode<'a>>
where
    I: IntoIterator<Item = Event<'a>>,
{
    let mut events = events.into_iter();
    let mut nodes = Vec::new();
    let mut slugger = Slugger::default();

    while let Some(event) = events.next() {
        match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let mut children = Vec::new();
                for inner in events.by_ref() {
                    if matches!(inner, Event::End(TagEnd::Heading(_))) {
                        break;
                    }
                    children.push(inner);
                }
                let text = plain_text(&children);
                let anchor = slugger.slug(&text);
                nodes.push(ContentNode::Heading(HeadingNode {
                    level,
                    text,
                    anchor,
                    id,
                    classes,
                    attrs,
                    children,
                }));
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                let (fenced, info) = match kind {
                    CodeBlockKind::Fenced(info) => (true, info.into_string()),
                    CodeBlockKind::Indented => (false, String::new()),
                };
                let mut code = String::new();
                for inner in events.by_ref() {
                    match inner {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(text) => code.push_str(&text),
                        _ => {}
                    }
                }
                nodes.push(ContentNode::CodeBlock(CodeBlockNode {
                    language: declared_language(&info),
                    info,
                    code,
                    fenced,
                }));
            }
            other => nodes.push(ContentNode::Markup(other)),
        }
    }

    nodes
}

/// First word of a code fence info string
pub fn declared_language(info: &str) -> Option<String> {
    LANGUAGE
        .captures(info)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn plain_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) | Event::InlineMath(t) | Event::DisplayMath(t) => {
                text.push_str(t)
            }
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text.trim().to_string()
}

/// Heading anchors; repeats get `-1`, `-2`, ... suffixes
#[derive(Debug, Default)]
struct Slugger {
    occurrences: HashMap<String, usize>,
}

impl Slugger {
    fn slug(&mut self, text: &str) -> String {
        let original = slug::slugify(text);
        if original.is_empty() {
            return original;
        }

        let mut result = original.clone();
        while self.occurrences.contains_key(&result) {
            let count = {
                let count = self.occurrences.entry(original.clone()).or_insert(0);
                *count += 1;
                *count
            };
            result = format!("{}-{}", original, count);
        }
        self.occurrences.insert(result.clone(), 0);
        result
    }
}
