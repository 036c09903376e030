//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters escaped in a single path segment (RFC 3986 unreserved stay)
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about/") // -> "https://example.com/blog/about/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Path of the detail page for `slug`
///
/// # Examples
/// ```ignore
/// article_path(&config, "hello world") // -> "/blog/article/hello%20world/"
/// ```
pub fn article_path(config: &SiteConfig, slug: &str) -> String {
    url_for(
        config,
        &format!("{}/{}/", article_dir(config), encode_segment(slug)),
    )
}

/// The article directory without surrounding slashes
pub fn article_dir(config: &SiteConfig) -> &str {
    config.article_dir.trim_matches('/')
}

/// Percent-encode one path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.url = "https://example.com".to_string();
        config.root = "/blog/".to_string();
        config
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/css/style.css"), "/blog/css/style.css");
        assert_eq!(url_for(&config, "about/"), "/blog/about/");
        assert_eq!(url_for(&config, ""), "/blog/");
        assert_eq!(url_for(&SiteConfig::default(), ""), "/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/about/"),
            "https://example.com/blog/about/"
        );
    }

    #[test]
    fn test_article_path() {
        let config = test_config();
        assert_eq!(article_path(&config, "a"), "/blog/article/a/");
        assert_eq!(
            article_path(&config, "hello world"),
            "/blog/article/hello%20world/"
        );
        assert_eq!(article_path(&SiteConfig::default(), "v1.2_x-y"), "/article/v1.2_x-y/");
    }

    #[test]
    fn test_article_dir_trims_slashes() {
        let mut config = SiteConfig::default();
        config.article_dir = "/posts/".to_string();
        assert_eq!(article_path(&config, "a"), "/posts/a/");
    }
}
