// src/runner/local.rs

//! In-process runner: tasks run on the current Tokio runtime, streams read
//! and write through a [`FileSystem`], watchers use `notify`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tracing::{debug, error, info};

use crate::errors::{ComposeError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::runner::registry::TaskRegistry;
use crate::runner::work::{self, TaskFn, WorkFuture};
use crate::runner::{Native, Runner};
use crate::stream::{dest_writer, FileStream, Transform};
use crate::types::{DestOptions, Globs, SrcOptions, WatchOptions};
use crate::watch::{spawn_watcher, GlobMatcher, WatcherHandle};

#[derive(Debug)]
pub struct LocalRunner {
    fs: Arc<dyn FileSystem>,
    cwd: PathBuf,
    registry: TaskRegistry,
    watchers: Mutex<Vec<WatcherHandle>>,
}

impl Default for LocalRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalRunner {
    /// Runner over the real filesystem, rooted at the process working
    /// directory.
    pub fn new() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_fs(Arc::new(RealFileSystem), cwd)
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            cwd: cwd.into(),
            registry: TaskRegistry::new(),
            watchers: Mutex::new(Vec::new()),
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Watchers started by this runner that have not been closed.
    pub fn watchers(&self) -> Vec<WatcherHandle> {
        let watchers = self.watchers.lock().unwrap_or_else(PoisonError::into_inner);
        watchers.iter().filter(|w| !w.is_closed()).cloned().collect()
    }

    fn works(&self, items: Vec<Native>) -> Result<Vec<TaskFn>> {
        items.into_iter().map(|item| self.work(item)).collect()
    }

    fn anchored(&self, dir: Option<&PathBuf>) -> PathBuf {
        match dir {
            Some(dir) => self.cwd.join(dir),
            None => self.cwd.clone(),
        }
    }
}

impl Runner for LocalRunner {
    fn series(&self, items: Vec<Native>) -> Result<TaskFn> {
        Ok(work::series(self.works(items)?))
    }

    fn parallel(&self, items: Vec<Native>) -> Result<TaskFn> {
        Ok(work::parallel(self.works(items)?))
    }

    fn src(&self, globs: &Globs, options: &SrcOptions) -> Result<FileStream> {
        let cwd = self.anchored(options.cwd.as_ref());
        let matcher = GlobMatcher::compile(globs, &cwd)?;
        Ok(FileStream::from_glob(
            Arc::clone(&self.fs),
            matcher,
            cwd,
            options.clone(),
        ))
    }

    fn dest(&self, path: &Path, options: &DestOptions) -> Result<Transform> {
        let out_dir = self.anchored(options.cwd.as_ref()).join(path);
        Ok(dest_writer(Arc::clone(&self.fs), out_dir, options.clone()))
    }

    fn watch(&self, globs: &Globs, options: &WatchOptions, body: TaskFn) -> Result<WatcherHandle> {
        let cwd = self.anchored(options.cwd.as_ref());
        let handle = spawn_watcher(globs, options, &cwd, self.registry.guarded(body))?;

        let mut watchers = self.watchers.lock().unwrap_or_else(PoisonError::into_inner);
        watchers.retain(|w| !w.is_closed());
        watchers.push(handle.clone());
        Ok(handle)
    }

    fn register_task(&self, name: &str, body: Native) -> Result<()> {
        let task = self.work(body)?;
        self.registry.set(name, task);
        Ok(())
    }

    fn task(&self, name: &str) -> Option<TaskFn> {
        self.registry.get(name)
    }

    fn task_names(&self) -> Vec<String> {
        self.registry.names()
    }

    fn work(&self, native: Native) -> Result<TaskFn> {
        match native {
            Native::Work(task) => Ok(task),
            Native::Ref(name) | Native::Registered(name) => Ok(self.registry.reference(&name)),
            other => Err(ComposeError::NotRunnable(other.kind().to_string())),
        }
    }

    fn run(&self, name: &str) -> WorkFuture {
        let name = name.to_string();
        let lookup = self.registry.check_acyclic(&name).and_then(|()| {
            self.registry
                .get(&name)
                .ok_or_else(|| ComposeError::TaskNotFound(name.clone()))
        });

        Box::pin(async move {
            let task = lookup?;
            info!(task = %name, "starting task");
            let started = Instant::now();

            let outcome = task.call().await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &outcome {
                Ok(()) => info!(task = %name, elapsed_ms, "finished task"),
                Err(err) => error!(task = %name, elapsed_ms, error = %err, "task failed"),
            }
            outcome
        })
    }

    fn close_watchers(&self) {
        let watchers: Vec<WatcherHandle> = self
            .watchers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        debug!(count = watchers.len(), "closing watchers");
        for watcher in watchers {
            watcher.close();
        }
    }
}
