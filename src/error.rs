//! Error types for loading and rendering pages

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a page
#[derive(Debug, Error)]
pub enum Error {
    /// No post file exists for the requested identifier
    #[error("post not found: {0}")]
    NotFound(String),

    /// Front matter could not be parsed
    #[error("failed to parse front matter in {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// A file or directory could not be read
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Template rendering failed
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    /// Renderer configuration is unusable
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn parse(source_name: impl Into<String>, message: impl ToString) -> Self {
        Error::Parse {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error should surface as a not-found page
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(Error::NotFound("missing.md".to_string()).is_not_found());
        assert!(!Error::parse("a.md", "bad yaml").is_not_found());
        let err = Error::io("posts", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_parse_error_message() {
        let err = Error::parse("hello.md", "expected a mapping");
        assert_eq!(
            err.to_string(),
            "failed to parse front matter in hello.md: expected a mapping"
        );
    }

    #[test]
    fn test_io_error_message_leaves_cause_to_source() {
        let err = Error::io("posts/a.md", io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(err.to_string(), r#"failed to read "posts/a.md""#);
        assert!(std::error::Error::source(&err).is_some());
    }
}
