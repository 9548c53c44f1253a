// src/watch/mod.rs

//! File watching and glob matching.
//!
//! This module is responsible for:
//! - Compiling glob patterns (with `!` negations) against a working directory.
//! - Wiring up a cross-platform filesystem watcher (`notify`) that runs a
//!   task body on matching changes and reports events to callbacks.
//!
//! It does **not** know about composables; the runner hands it a ready
//! [`TaskFn`](crate::runner::TaskFn) to run.

pub mod patterns;
pub mod watcher;

pub use patterns::{collect_matching_files, GlobMatcher};
pub use watcher::{spawn_watcher, EventCallback, WatcherHandle};
