// src/stream/transform.rs

use std::fmt;
use std::sync::Arc;

use crate::errors::Result;
use crate::stream::file::VirtualFile;

type TransformFn = dyn Fn(VirtualFile) -> Result<Option<VirtualFile>> + Send + Sync;

/// A pipe stage: receives each file and passes on a (possibly rewritten)
/// file, or `None` to drop it from the stream.
#[derive(Clone)]
pub struct Transform {
    label: String,
    f: Arc<TransformFn>,
}

impl Transform {
    pub fn new<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(VirtualFile) -> Result<Option<VirtualFile>> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            f: Arc::new(f),
        }
    }

    /// Stage that rewrites every file.
    pub fn map<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(VirtualFile) -> Result<VirtualFile> + Send + Sync + 'static,
    {
        Self::new(label, move |file| f(file).map(Some))
    }

    /// Stage that keeps only files for which `keep` returns true.
    pub fn filter<F>(label: impl Into<String>, keep: F) -> Self
    where
        F: Fn(&VirtualFile) -> bool + Send + Sync + 'static,
    {
        Self::new(label, move |file| Ok(keep(&file).then_some(file)))
    }

    /// Stage that observes files without changing them.
    pub fn inspect<F>(label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&VirtualFile) + Send + Sync + 'static,
    {
        Self::new(label, move |file| {
            f(&file);
            Ok(Some(file))
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn apply(&self, file: VirtualFile) -> Result<Option<VirtualFile>> {
        (self.f)(file)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
