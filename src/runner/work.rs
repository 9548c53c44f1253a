// src/runner/work.rs

//! Runnable work units and the sequential / concurrent combinators.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, trace};

use crate::errors::{ComposeError, Result};

/// Boxed future returned by every task function.
pub type WorkFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

type WorkFn = dyn Fn() -> WorkFuture + Send + Sync;

/// A task function: something the runner can invoke any number of times.
///
/// Cloning is cheap and clones share the same underlying closure.
#[derive(Clone)]
pub struct TaskFn {
    display_name: String,
    /// Task names this function looks up by name when it runs.
    references: Vec<String>,
    f: Arc<WorkFn>,
}

impl TaskFn {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            display_name: "<anonymous>".to_string(),
            references: Vec::new(),
            f: Arc::new(move || Box::pin(f())),
        }
    }

    /// Wrap a synchronous closure.
    pub fn from_sync<F>(f: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        Self::new(move || std::future::ready(f()))
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub(crate) fn with_references(mut self, references: Vec<String>) -> Self {
        self.references = references;
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }

    pub fn call(&self) -> WorkFuture {
        (self.f)()
    }
}

impl fmt::Debug for TaskFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFn")
            .field("display_name", &self.display_name)
            .field("references", &self.references)
            .finish_non_exhaustive()
    }
}

fn merged_references(children: &[TaskFn]) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    for child in children {
        for name in child.references() {
            if !refs.contains(name) {
                refs.push(name.clone());
            }
        }
    }
    refs
}

/// Run `children` one after another, stopping at the first failure.
pub fn series(children: Vec<TaskFn>) -> TaskFn {
    let references = merged_references(&children);
    let children = Arc::new(children);

    TaskFn::new(move || {
        let children = Arc::clone(&children);
        async move {
            for (index, child) in children.iter().enumerate() {
                trace!(index, child = child.display_name(), "series: starting child");
                child.call().await?;
            }
            Ok(())
        }
    })
    .named("<series>")
    .with_references(references)
}

/// Run `children` concurrently and wait for all of them.
///
/// Every child runs to completion even when a sibling fails; the first
/// failure observed is returned.
pub fn parallel(children: Vec<TaskFn>) -> TaskFn {
    let references = merged_references(&children);
    let children = Arc::new(children);

    TaskFn::new(move || {
        let children = Arc::clone(&children);
        async move {
            let mut set = JoinSet::new();
            for child in children.iter() {
                trace!(child = child.display_name(), "parallel: spawning child");
                set.spawn(child.call());
            }

            let mut first_error = None;
            while let Some(joined) = set.join_next().await {
                let outcome = match joined {
                    Ok(outcome) => outcome,
                    Err(join_err) => Err(ComposeError::TaskFailed {
                        task: "<parallel>".to_string(),
                        reason: join_err.to_string(),
                    }),
                };
                if let Err(err) = outcome {
                    debug!(error = %err, "parallel: child failed");
                    first_error.get_or_insert(err);
                }
            }

            match first_error {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    })
    .named("<parallel>")
    .with_references(references)
}
