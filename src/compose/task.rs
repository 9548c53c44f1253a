// src/compose/task.rs

use std::sync::Arc;

use tracing::debug;

use crate::compose::{resolve_if_composable, Item};
use crate::errors::Result;
use crate::runner::{Native, Runner};

/// A named task. Resolving it registers the body with the runner.
#[derive(Debug, Clone)]
pub struct Task {
    name: String,
    body: Item,
}

impl Task {
    pub fn new(name: impl Into<String>, body: impl Into<Item>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &Item {
        &self.body
    }

    pub fn resolve<R: Runner>(&self, runner: &Arc<R>) -> Result<Native> {
        debug!(task = %self.name, "registering task");
        let body = resolve_if_composable(runner, &self.body)?;
        runner.register_task(&self.name, body)?;
        Ok(Native::Registered(self.name.clone()))
    }
}
