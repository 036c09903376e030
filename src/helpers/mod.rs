//! Helper functions shared by the renderers and templates

mod html;
mod url;

pub use html::*;
pub use url::*;
