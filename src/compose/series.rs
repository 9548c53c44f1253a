// src/compose/series.rs

use std::sync::Arc;

use tracing::trace;

use crate::compose::{resolve_all, Item};
use crate::errors::Result;
use crate::runner::{Native, Runner};

/// Children that run one after another, in the order given.
#[derive(Debug, Clone, Default)]
pub struct Series {
    children: Vec<Item>,
}

impl Series {
    pub fn new<I>(children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        Self {
            children: children.into_iter().map(Into::into).collect(),
        }
    }

    pub fn children(&self) -> &[Item] {
        &self.children
    }

    pub fn resolve<R: Runner>(&self, runner: &Arc<R>) -> Result<Native> {
        trace!(children = self.children.len(), "resolving series");
        let items = resolve_all(runner, &self.children)?;
        Ok(Native::Work(runner.series(items)?))
    }
}

/// Children the runner may run concurrently.
///
/// Insertion order is kept so resolution is deterministic; execution order
/// is up to the runner.
#[derive(Debug, Clone, Default)]
pub struct Parallel {
    children: Vec<Item>,
}

impl Parallel {
    pub fn new<I>(children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        Self {
            children: children.into_iter().map(Into::into).collect(),
        }
    }

    pub fn children(&self) -> &[Item] {
        &self.children
    }

    pub fn resolve<R: Runner>(&self, runner: &Arc<R>) -> Result<Native> {
        trace!(children = self.children.len(), "resolving parallel");
        let items = resolve_all(runner, &self.children)?;
        Ok(Native::Work(runner.parallel(items)?))
    }
}
