//! Post store - enumerates and reads markdown posts from the content directory

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{FrontMatter, Post};
use crate::error::{Error, Result};

/// Extension of post files; the slug is the file name without it
const POST_EXTENSION: &str = "md";

/// Identifier of a post: its file name and the slug derived from it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostId {
    pub file_name: String,
    pub slug: String,
}

impl PostId {
    /// Derive the identifier from a file name, `None` unless it is a visible `.md` file
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        if file_name.starts_with('.') {
            return None;
        }
        let path = Path::new(file_name);
        if path.extension().and_then(|e| e.to_str()) != Some(POST_EXTENSION) {
            return None;
        }
        let slug = path.file_stem()?.to_str()?;
        Some(Self {
            file_name: file_name.to_string(),
            slug: slug.to_string(),
        })
    }

    /// The identifier a detail page request for `slug` resolves to
    pub fn from_slug(slug: &str) -> Self {
        Self {
            file_name: format!("{}.{}", slug, POST_EXTENSION),
            slug: slug.to_string(),
        }
    }
}

/// Read-only view of the content directory
#[derive(Debug, Clone)]
pub struct PostStore {
    root: PathBuf,
}

impl PostStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List all posts in file-system enumeration order
    pub fn list_post_identifiers(&self) -> Result<Vec<PostId>> {
        if !self.root.exists() {
            tracing::debug!("Content directory {:?} does not exist", self.root);
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&self.root).to_path_buf();
                Error::io(path, io::Error::from(e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(id) = entry.file_name().to_str().and_then(PostId::from_file_name) {
                ids.push(id);
            }
        }

        Ok(ids)
    }

    /// Read the full contents of a post file
    pub fn read_post_raw(&self, file_name: &str) -> Result<String> {
        if !is_plain_file_name(file_name) {
            return Err(Error::NotFound(file_name.to_string()));
        }

        let path = self.root.join(file_name);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(Error::NotFound(file_name.to_string()))
            }
            Err(e) => Err(Error::io(path, e)),
        }
    }

    /// Read and split a post into front matter and body
    pub fn load_post(&self, id: &PostId) -> Result<Post> {
        let raw = self.read_post_raw(&id.file_name)?;
        let (front_matter, body) = FrontMatter::parse_named(&raw, &id.file_name)?;
        Ok(Post::new(id.slug.clone(), front_matter, body.to_string()))
    }
}

/// Rejects names that would escape the content directory
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}
