// src/watch/watcher.rs

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use anyhow::anyhow;
use notify::event::{ModifyKind, RemoveKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, trace, warn};

use crate::errors::Result;
use crate::runner::TaskFn;
use crate::types::{Globs, WatchEvent, WatchOptions};
use crate::watch::patterns::{path_str, GlobMatcher};

/// Callback attached to a watcher for one event kind.
pub type EventCallback = Arc<dyn Fn(WatchEvent, &Path) + Send + Sync>;

struct Shared {
    /// `None` once closed.
    inner: Mutex<Option<RecommendedWatcher>>,
    callbacks: RwLock<BTreeMap<WatchEvent, EventCallback>>,
    closed: watch::Sender<bool>,
}

/// Handle for a running filesystem watcher.
///
/// Clones refer to the same watcher. Watching stops when [`close`] is called
/// on any clone, or when the last clone is dropped.
///
/// [`close`]: WatcherHandle::close
#[derive(Clone)]
pub struct WatcherHandle {
    shared: Arc<Shared>,
}

impl fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl WatcherHandle {
    /// Attach `callback` to `event`, replacing any earlier callback for it.
    pub fn on(&self, event: WatchEvent, callback: EventCallback) {
        let mut callbacks = self
            .shared
            .callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        callbacks.insert(event, callback);
    }

    pub fn close(&self) {
        let watcher = self
            .shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if watcher.is_some() {
            info!("file watcher closed");
        }
        self.shared.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.shared.closed.borrow()
    }

    /// Wait until the watcher is closed.
    pub async fn closed(&self) {
        let mut rx = self.shared.closed.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }

    fn fire(&self, event: WatchEvent, path: &Path) {
        let callbacks = self
            .shared
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for key in [event, WatchEvent::All] {
            if let Some(cb) = callbacks.get(&key) {
                cb(event, path);
            }
        }
    }
}

/// Start watching `globs` and run `body` whenever a matching path changes.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_watcher(
    globs: &Globs,
    options: &WatchOptions,
    cwd: &Path,
    body: TaskFn,
) -> Result<WatcherHandle> {
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|_| anyhow!("watching requires a running Tokio runtime"))?;

    let cwd = absolute_dir(cwd);
    let matcher = GlobMatcher::compile(globs, &cwd)?;

    // Channel from the blocking notify callback into the async world.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("taskcompose: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("taskcompose: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    let roots = watch_roots(matcher.bases());
    for root in &roots {
        watcher.watch(root, RecursiveMode::Recursive)?;
    }
    info!(?roots, "file watcher started");

    let (closed_tx, _) = watch::channel(false);
    let handle = WatcherHandle {
        shared: Arc::new(Shared {
            inner: Mutex::new(Some(watcher)),
            callbacks: RwLock::new(BTreeMap::new()),
            closed: closed_tx,
        }),
    };

    let (trigger_tx, trigger_rx) = mpsc::unbounded_channel::<()>();
    if options.run_on_start {
        let _ = trigger_tx.send(());
    }

    // The event loop only holds a weak reference so dropping every handle
    // still stops the watcher.
    let weak = Arc::downgrade(&handle.shared);
    let trigger_events = options.events.clone();
    runtime.spawn(async move {
        let mut event_rx = event_rx;
        while let Some(event) = event_rx.recv().await {
            let Some(shared) = weak.upgrade() else { break };
            let handle = WatcherHandle { shared };
            if handle.is_closed() {
                break;
            }
            trace!(?event, "received notify event");

            for (index, path) in event.paths.iter().enumerate() {
                if !matcher.matches(path) {
                    continue;
                }
                let Some(kind) = classify(&event.kind, path, index) else {
                    continue;
                };
                debug!(event = %kind, path = %path_str(path), "watched path changed");
                handle.fire(kind, path);
                if trigger_events.contains(&kind) {
                    let _ = trigger_tx.send(());
                }
            }
        }
        debug!("watcher event loop finished");
    });

    runtime.spawn(run_body_on_trigger(
        body,
        trigger_rx,
        options.clone(),
        handle.shared.closed.subscribe(),
    ));

    Ok(handle)
}

/// Debounce triggers and run `body`, one run at a time.
async fn run_body_on_trigger(
    body: TaskFn,
    mut trigger_rx: mpsc::UnboundedReceiver<()>,
    options: WatchOptions,
    closed: watch::Receiver<bool>,
) {
    while trigger_rx.recv().await.is_some() {
        tokio::time::sleep(options.delay).await;
        while trigger_rx.try_recv().is_ok() {}

        if *closed.borrow() {
            break;
        }

        info!(task = body.display_name(), "change detected; running watch task");
        if let Err(err) = body.call().await {
            error!(task = body.display_name(), error = %err, "watch task failed");
        }

        if !options.queue {
            while trigger_rx.try_recv().is_ok() {}
        }
    }
    debug!("watch task loop finished");
}

/// Map a notify event onto the event kind reported for `path`, the
/// `index`-th path of the event.
fn classify(kind: &EventKind, path: &Path, index: usize) -> Option<WatchEvent> {
    match kind {
        EventKind::Create(_) => Some(if path.is_dir() {
            WatchEvent::AddDir
        } else {
            WatchEvent::Add
        }),
        EventKind::Remove(RemoveKind::Folder) => Some(WatchEvent::UnlinkDir),
        EventKind::Remove(_) => Some(WatchEvent::Unlink),
        EventKind::Modify(ModifyKind::Name(mode)) => {
            let gone = match mode {
                RenameMode::From => true,
                RenameMode::To => false,
                RenameMode::Both => index == 0,
                _ => !path.exists(),
            };
            Some(if gone { WatchEvent::Unlink } else { WatchEvent::Add })
        }
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) if path.is_dir() => None,
        EventKind::Modify(_) => Some(WatchEvent::Change),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}

fn absolute_dir(dir: &Path) -> PathBuf {
    let dir = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(dir),
            Err(err) => {
                warn!(error = %err, "cannot resolve working directory; watching relative paths");
                dir.to_path_buf()
            }
        }
    };
    // Canonicalize once so event paths and patterns share a prefix.
    dir.canonicalize().unwrap_or(dir)
}

/// Directories to watch recursively: the existing ancestor of every base,
/// without any directory that another root already covers.
fn watch_roots(bases: &[PathBuf]) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = bases.iter().map(|b| existing_ancestor(b)).collect();
    candidates.sort_by_key(|p| p.components().count());

    let mut roots: Vec<PathBuf> = Vec::new();
    for root in candidates {
        if !roots.iter().any(|r| root.starts_with(r)) {
            roots.push(root);
        }
    }
    roots
}

/// `path` itself, or its closest ancestor that exists.
fn existing_ancestor(path: &Path) -> PathBuf {
    let mut current = path;
    loop {
        if current.exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => current = parent,
            _ => return PathBuf::from("."),
        }
    }
}
