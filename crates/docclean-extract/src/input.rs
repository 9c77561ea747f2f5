//! Input documents

use crate::error::{ExtractError, Result};
use std::borrow::Cow;
use std::path::Path;

/// Raw document bytes plus the file name used for format detection.
///
/// The content is either borrowed from the caller or owned after a single
/// read from disk. It is never modified.
#[derive(Debug, Clone)]
pub struct InputDocument<'a> {
    content: Cow<'a, [u8]>,
    filename: String,
}

impl<'a> InputDocument<'a> {
    /// Wrap an in-memory buffer
    pub fn from_bytes(content: &'a [u8], filename: impl Into<String>) -> Result<Self> {
        let filename = filename.into();
        if filename.trim().is_empty() {
            return Err(ExtractError::InvalidInput(
                "a file name is required to detect the format".to_string(),
            ));
        }
        Ok(Self {
            content: Cow::Borrowed(content),
            filename,
        })
    }

    /// Length of the content in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the content is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl InputDocument<'static> {
    /// Read `path` into memory with exactly one blocking read
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = file_name_of(path)?;
        let content = std::fs::read(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::owned(content, filename))
    }

    /// Read `path` into memory on the tokio runtime
    pub async fn from_path_async(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = file_name_of(path)?;
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| ExtractError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::owned(content, filename))
    }

    /// Take ownership of a buffer
    pub fn owned(content: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            content: Cow::Owned(content),
            filename: filename.into(),
        }
    }
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            ExtractError::InvalidInput(format!("path has no file name: {}", path.display()))
        })
}
