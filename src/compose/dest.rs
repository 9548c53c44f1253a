// src/compose/dest.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::Result;
use crate::runner::{Native, Runner};
use crate::types::DestOptions;

/// A destination writer, to be piped after a source.
#[derive(Debug, Clone)]
pub struct Dest {
    path: PathBuf,
    options: DestOptions,
}

impl Dest {
    pub fn new(path: impl Into<PathBuf>, options: Option<DestOptions>) -> Self {
        Self {
            path: path.into(),
            options: options.unwrap_or_default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &DestOptions {
        &self.options
    }

    pub fn resolve<R: Runner>(&self, runner: &Arc<R>) -> Result<Native> {
        Ok(Native::Stage(runner.dest(&self.path, &self.options)?))
    }
}
