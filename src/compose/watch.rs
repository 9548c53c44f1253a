// src/compose/watch.rs

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::compose::{resolve_all, resolve_if_composable, Item};
use crate::errors::{ComposeError, Result};
use crate::runner::{Native, Runner};
use crate::types::{Globs, WatchEvent, WatchOptions};
use crate::watch::EventCallback;

/// A filesystem watch: globs, a body to run on change, and per-event
/// callbacks.
///
/// Callbacks are registered with [`Watch::on`] during setup; the node is
/// not meant to be shared across threads while it is being built.
#[derive(Clone)]
pub struct Watch {
    globs: Globs,
    options: WatchOptions,
    body: Vec<Item>,
    events: BTreeMap<WatchEvent, EventCallback>,
}

impl fmt::Debug for Watch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watch")
            .field("globs", &self.globs)
            .field("options", &self.options)
            .field("body", &self.body)
            .field("events", &self.events.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Watch {
    pub fn new<I>(globs: impl Into<Globs>, options: Option<WatchOptions>, body: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Item>,
    {
        Self {
            globs: globs.into(),
            options: options.unwrap_or_default(),
            body: body.into_iter().map(Into::into).collect(),
            events: BTreeMap::new(),
        }
    }

    /// Call `callback` for every `event` on a watched path. A later
    /// registration for the same event replaces the earlier one.
    pub fn on<F>(&mut self, event: WatchEvent, callback: F) -> &mut Self
    where
        F: Fn(WatchEvent, &Path) + Send + Sync + 'static,
    {
        self.events.insert(event, Arc::new(callback));
        self
    }

    pub fn globs(&self) -> &Globs {
        &self.globs
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    pub fn body(&self) -> &[Item] {
        &self.body
    }

    /// Events that have a callback attached.
    pub fn events(&self) -> impl Iterator<Item = WatchEvent> + '_ {
        self.events.keys().copied()
    }

    /// Start watching. The body is resolved like a series child; several
    /// body items run in parallel.
    pub fn resolve<R: Runner>(&self, runner: &Arc<R>) -> Result<Native> {
        let body = match self.body.as_slice() {
            [] => {
                return Err(ComposeError::ConfigError(format!(
                    "watch on {:?} has no task to run",
                    self.globs.patterns()
                )));
            }
            [single] => runner.work(resolve_if_composable(runner, single)?)?,
            many => runner.parallel(resolve_all(runner, many)?)?,
        };

        let watcher = runner.watch(&self.globs, &self.options, body)?;
        for (event, callback) in &self.events {
            watcher.on(*event, Arc::clone(callback));
        }
        Ok(Native::Watcher(watcher))
    }
}
