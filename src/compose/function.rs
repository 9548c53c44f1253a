// src/compose/function.rs

use std::sync::Arc;

use tracing::debug;

use crate::compose::{resolve_if_composable, Item};
use crate::errors::Result;
use crate::runner::{Native, Runner, TaskFn};

/// Wraps a value so it can stand wherever the runner expects a plain task
/// function.
///
/// A wrapped composable is resolved again every time the function runs.
#[derive(Debug, Clone)]
pub struct Function {
    inner: Item,
}

impl Function {
    pub fn new(inner: impl Into<Item>) -> Self {
        Self {
            inner: inner.into(),
        }
    }

    pub fn inner(&self) -> &Item {
        &self.inner
    }

    pub fn resolve<R: Runner>(&self, runner: &Arc<R>) -> Result<Native> {
        let node = match &self.inner {
            Item::Composable(node) => node.as_ref().clone(),
            plain => return resolve_if_composable(runner, plain),
        };

        let references = node.references();
        let runner = Arc::clone(runner);
        let task = TaskFn::new(move || {
            let node = node.clone();
            let runner = Arc::clone(&runner);
            async move {
                let native = node.resolve(&runner)?;
                settle(runner.as_ref(), native).await
            }
        })
        .named("<fn>")
        .with_references(references);

        Ok(Native::Work(task))
    }
}

/// Execute a resolved value to completion.
async fn settle<R: Runner>(runner: &R, native: Native) -> Result<()> {
    match native {
        Native::Work(task) => task.call().await,
        Native::Ref(name) | Native::Registered(name) => runner.run(&name).await,
        Native::Stream(stream) => {
            let files = stream.drain_blocking().await?;
            debug!(files, "stream drained");
            Ok(())
        }
        Native::Watcher(watcher) => {
            watcher.closed().await;
            Ok(())
        }
        Native::Stage(stage) => {
            debug!(stage = stage.label(), "nothing piped into stage; done");
            Ok(())
        }
    }
}
