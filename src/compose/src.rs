// src/compose/src.rs

use std::sync::Arc;

use crate::compose::{resolve_if_composable, Item};
use crate::errors::Result;
use crate::runner::{Native, Runner};
use crate::types::{Globs, SrcOptions};

/// A source stream plus the stages its files are piped through.
#[derive(Debug, Clone)]
pub struct Src {
    globs: Globs,
    options: SrcOptions,
    pipes: Vec<Item>,
}

impl Src {
    pub fn new(globs: impl Into<Globs>, options: Option<SrcOptions>) -> Self {
        Self {
            globs: globs.into(),
            options: options.unwrap_or_default(),
            pipes: Vec::new(),
        }
    }

    /// Append a stage. Stages run in the order they were piped.
    ///
    /// The stage is not checked here; a value that cannot be piped fails
    /// at resolution.
    pub fn pipe(mut self, stage: impl Into<Item>) -> Self {
        self.pipes.push(stage.into());
        self
    }

    pub fn globs(&self) -> &Globs {
        &self.globs
    }

    pub fn options(&self) -> &SrcOptions {
        &self.options
    }

    pub fn pipes(&self) -> &[Item] {
        &self.pipes
    }

    pub fn resolve<R: Runner>(&self, runner: &Arc<R>) -> Result<Native> {
        let mut stream = runner.src(&self.globs, &self.options)?;
        for pipe in &self.pipes {
            stream = stream.pipe_native(resolve_if_composable(runner, pipe)?)?;
        }
        Ok(Native::Stream(stream))
    }
}
