//! Configuration module

mod site;

pub use site::CarouselConfig;
pub use site::CarouselDirection;
pub use site::HighlightConfig;
pub use site::MarkdownConfig;
pub use site::SiteConfig;
