// src/compose/orchestrator.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::compose::{Dest, Function, Item, Parallel, Pump, Series, Src, Task, Watch};
use crate::errors::{ComposeError, Result};
use crate::runner::{LocalRunner, Runner};
use crate::types::{DestOptions, Globs, SrcOptions, WatchOptions};

/// Collects named tasks and watchers, then binds them all to a runner in a
/// single [`compose`](Compose::compose) call.
///
/// ```no_run
/// use taskcompose::compose::Compose;
/// use taskcompose::runner::{Runner, TaskFn};
///
/// # async fn demo() -> taskcompose::errors::Result<()> {
/// let mut gc = Compose::new();
/// let clean = TaskFn::from_sync(|| Ok(()));
/// let build = TaskFn::from_sync(|| Ok(()));
///
/// let default = gc.series([clean, build]);
/// gc.task("default", default);
///
/// let runner = gc.compose()?;
/// runner.run("default").await?;
/// # Ok(())
/// # }
/// ```
pub struct Compose<R: Runner = LocalRunner> {
    runner: Arc<R>,
    tasks: BTreeMap<String, Task>,
    watchers: Vec<Watch>,
    composed: bool,
}

impl Compose<LocalRunner> {
    /// Orchestrator over a fresh [`LocalRunner`].
    pub fn new() -> Self {
        Self::with_runner(Arc::new(LocalRunner::new()))
    }
}

impl Default for Compose<LocalRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Runner> Compose<R> {
    pub fn with_runner(runner: Arc<R>) -> Self {
        Self {
            runner,
            tasks: BTreeMap::new(),
            watchers: Vec::new(),
            composed: false,
        }
    }

    pub fn runner(&self) -> Arc<R> {
        Arc::clone(&self.runner)
    }

    pub fn src(&self, globs: impl Into<Globs>, options: Option<SrcOptions>) -> Src {
        Src::new(globs, options)
    }

    pub fn dest(&self, path: impl Into<PathBuf>, options: Option<DestOptions>) -> Dest {
        Dest::new(path, options)
    }

    /// Create a watch and remember it, so `compose` starts it even though
    /// it is not a named task.
    pub fn watch<I>(
        &mut self,
        globs: impl Into<Globs>,
        options: Option<WatchOptions>,
        body: I,
    ) -> &mut Watch
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        let index = self.watchers.len();
        self.watchers.push(Watch::new(globs, options, body));
        &mut self.watchers[index]
    }

    pub fn func(&self, inner: impl Into<Item>) -> Function {
        Function::new(inner)
    }

    pub fn pump<I, F>(&self, stages: I, on_complete: F) -> Pump
    where
        I: IntoIterator,
        I::Item: Into<Item>,
        F: Fn(Option<&ComposeError>) + Send + Sync + 'static,
    {
        Pump::new(stages, on_complete)
    }

    pub fn series<I>(&self, children: I) -> Series
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        Series::new(children)
    }

    pub fn parallel<I>(&self, children: I) -> Parallel
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        Parallel::new(children)
    }

    /// Register `body` under `name`, replacing any earlier task of that name.
    pub fn task(&mut self, name: impl Into<String>, body: impl Into<Item>) -> &mut Self {
        let task = Task::new(name, body);
        if self.tasks.contains_key(task.name()) {
            debug!(task = task.name(), "replacing task definition");
        }
        self.tasks.insert(task.name().to_string(), task);
        self
    }

    /// The task previously registered under `name`.
    pub fn get_task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    pub fn watchers(&self) -> &[Watch] {
        &self.watchers
    }

    pub fn is_composed(&self) -> bool {
        self.composed
    }

    /// Resolve every task and watcher against the runner and hand the
    /// runner back.
    ///
    /// Can only be called once: watchers started by a second call would
    /// duplicate the first ones.
    pub fn compose(&mut self) -> Result<Arc<R>> {
        if self.composed {
            return Err(ComposeError::AlreadyComposed);
        }
        self.composed = true;

        for task in self.tasks.values() {
            task.resolve(&self.runner)?;
        }
        for watch in &self.watchers {
            watch.resolve(&self.runner)?;
        }

        info!(
            tasks = self.tasks.len(),
            watchers = self.watchers.len(),
            "composed task graph"
        );
        Ok(Arc::clone(&self.runner))
    }
}
