// src/runner/mod.rs

//! The task runner the composable layer resolves against.
//!
//! - [`Runner`] is the narrow interface composables talk to.
//! - [`Native`] is the set of runner-native values a composable resolves to.
//! - [`work`] holds [`TaskFn`] and the series / parallel combinators.
//! - [`registry`] is the forward-referencing task registry.
//! - [`local`] is the in-process implementation, [`LocalRunner`].

pub mod local;
pub mod registry;
pub mod work;

use std::path::Path;

use crate::errors::Result;
use crate::stream::{FileStream, Transform};
use crate::types::{DestOptions, Globs, SrcOptions, WatchOptions};
use crate::watch::WatcherHandle;

pub use local::LocalRunner;
pub use registry::TaskRegistry;
pub use work::{TaskFn, WorkFuture};

/// A value in the runner's own vocabulary.
#[derive(Debug, Clone)]
pub enum Native {
    /// Something runnable.
    Work(TaskFn),
    /// A task referenced by name, looked up when it runs.
    Ref(String),
    /// A pipe stage (transform or destination writer).
    Stage(Transform),
    /// A readable stream of files.
    Stream(FileStream),
    /// A live filesystem watcher.
    Watcher(WatcherHandle),
    /// The name a task was just registered under.
    Registered(String),
}

impl Native {
    /// Short human-readable description, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Native::Work(_) => "task function",
            Native::Ref(_) => "task reference",
            Native::Stage(_) => "transform",
            Native::Stream(_) => "file stream",
            Native::Watcher(_) => "watcher",
            Native::Registered(_) => "task registration",
        }
    }
}

/// Operations a task runner exposes to the composable layer.
pub trait Runner: Send + Sync + 'static {
    /// Combine items into work that runs them in order.
    fn series(&self, items: Vec<Native>) -> Result<TaskFn>;

    /// Combine items into work that runs them concurrently.
    fn parallel(&self, items: Vec<Native>) -> Result<TaskFn>;

    fn src(&self, globs: &Globs, options: &SrcOptions) -> Result<FileStream>;

    fn dest(&self, path: &Path, options: &DestOptions) -> Result<Transform>;

    /// Start watching `globs`, running `body` on matching changes.
    fn watch(&self, globs: &Globs, options: &WatchOptions, body: TaskFn) -> Result<WatcherHandle>;

    /// Register (or replace) a named task.
    fn register_task(&self, name: &str, body: Native) -> Result<()>;

    /// Look up a registered task.
    fn task(&self, name: &str) -> Option<TaskFn>;

    fn task_names(&self) -> Vec<String>;

    /// Coerce a native value into something runnable.
    fn work(&self, native: Native) -> Result<TaskFn>;

    /// Look up `name` and run it.
    fn run(&self, name: &str) -> WorkFuture;

    /// Close every watcher this runner started.
    fn close_watchers(&self);
}
