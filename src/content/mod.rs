//! Content module - post store, front matter and markdown processing

pub mod frontmatter;
pub mod markdown;
mod post;
pub mod store;

pub use frontmatter::{FrontMatter, MatterFormat, Metadata};
pub use markdown::MarkdownRenderer;
pub use post::Post;
pub use store::{PostId, PostStore};
