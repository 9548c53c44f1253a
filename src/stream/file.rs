// src/stream/file.rs

use std::borrow::Cow;
use std::path::PathBuf;

/// A file travelling through a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFile {
    /// Directory `path` is considered relative to.
    pub base: PathBuf,
    pub path: PathBuf,
    /// `None` when the source was opened with `read = false`.
    pub contents: Option<Vec<u8>>,
}

impl VirtualFile {
    pub fn new(base: impl Into<PathBuf>, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            base: base.into(),
            path: path.into(),
            contents: Some(contents.into()),
        }
    }

    /// Path relative to `base`; falls back to the file name.
    pub fn relative(&self) -> PathBuf {
        match self.path.strip_prefix(&self.base) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => self.path.file_name().map(PathBuf::from).unwrap_or_default(),
        }
    }

    pub fn contents_lossy(&self) -> Option<Cow<'_, str>> {
        self.contents.as_deref().map(String::from_utf8_lossy)
    }

    pub fn set_contents(&mut self, contents: impl Into<Vec<u8>>) {
        self.contents = Some(contents.into());
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }

    /// Replace the extension, keeping the file under the same base.
    pub fn set_extension(&mut self, ext: &str) {
        self.path.set_extension(ext);
    }
}
