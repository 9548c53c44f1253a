// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::{ComposeError, Result};
use crate::types::{WatchEvent, WatchOptions};

/// Composefile as deserialized, before validation.
///
/// ```toml
/// [config]
/// default_task = "build"
///
/// [task.lint]
/// cmd = "cargo clippy"
///
/// [task.build]
/// series = ["lint", "compile"]
///
/// [[watch]]
/// globs = ["src/**/*.rs"]
/// run = ["build"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawComposeFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// Tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,

    /// Watchers from `[[watch]]`.
    #[serde(default)]
    pub watch: Vec<WatchConfig>,
}

/// A validated composefile. Built through `TryFrom<RawComposeFile>`.
#[derive(Debug, Clone)]
pub struct ComposeFile {
    pub config: ConfigSection,
    pub task: BTreeMap<String, TaskConfig>,
    pub watch: Vec<WatchConfig>,
}

impl ComposeFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        task: BTreeMap<String, TaskConfig>,
        watch: Vec<WatchConfig>,
    ) -> Self {
        Self {
            config,
            task,
            watch,
        }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Task run when none is named on the command line.
    #[serde(default = "default_task_name")]
    pub default_task: String,

    /// Working directory for commands, streams and watchers, relative to
    /// the composefile's directory.
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

fn default_task_name() -> String {
    "default".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            default_task: default_task_name(),
            cwd: None,
        }
    }
}

/// `[task.<name>]` section. Exactly one of `cmd`, `series`, `parallel`
/// and `src` must be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskConfig {
    /// Shown by `--list`.
    #[serde(default)]
    pub description: Option<String>,

    /// Shell command line.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Task names run one after another.
    #[serde(default)]
    pub series: Option<Vec<String>>,

    /// Task names run concurrently.
    #[serde(default)]
    pub parallel: Option<Vec<String>>,

    /// Globs read as a file stream.
    #[serde(default)]
    pub src: Option<Vec<String>>,

    /// Output directory for the `src` stream.
    #[serde(default)]
    pub dest: Option<String>,

    /// Accept a singular `src` glob that matches nothing.
    #[serde(default)]
    pub allow_empty: bool,
}

/// The one body a task config declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskBody<'a> {
    Cmd(&'a str),
    Series(&'a [String]),
    Parallel(&'a [String]),
    Src {
        globs: &'a [String],
        dest: Option<&'a str>,
        allow_empty: bool,
    },
}

impl TaskConfig {
    /// Names of the body keys that are set.
    pub fn body_kinds(&self) -> Vec<&'static str> {
        let mut kinds = Vec::new();
        if self.cmd.is_some() {
            kinds.push("cmd");
        }
        if self.series.is_some() {
            kinds.push("series");
        }
        if self.parallel.is_some() {
            kinds.push("parallel");
        }
        if self.src.is_some() {
            kinds.push("src");
        }
        kinds
    }

    /// The task body, or `None` unless exactly one body key is set.
    pub fn body(&self) -> Option<TaskBody<'_>> {
        if self.body_kinds().len() != 1 {
            return None;
        }
        if let Some(cmd) = &self.cmd {
            return Some(TaskBody::Cmd(cmd));
        }
        if let Some(names) = &self.series {
            return Some(TaskBody::Series(names));
        }
        if let Some(names) = &self.parallel {
            return Some(TaskBody::Parallel(names));
        }
        self.src.as_deref().map(|globs| TaskBody::Src {
            globs,
            dest: self.dest.as_deref(),
            allow_empty: self.allow_empty,
        })
    }

    /// Task names this task refers to.
    pub fn references(&self) -> &[String] {
        match (&self.series, &self.parallel) {
            (Some(names), _) | (None, Some(names)) => names.as_slice(),
            (None, None) => &[],
        }
    }
}

/// `[[watch]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    pub globs: Vec<String>,

    /// Task names run (in parallel) when a watched file changes.
    pub run: Vec<String>,

    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    #[serde(default = "default_queue")]
    pub queue: bool,

    #[serde(default)]
    pub run_on_start: bool,

    /// Event names that trigger `run`. Empty means add, change and unlink.
    #[serde(default)]
    pub events: Vec<String>,
}

fn default_delay_ms() -> u64 {
    200
}

fn default_queue() -> bool {
    true
}

impl WatchConfig {
    pub fn options(&self) -> Result<WatchOptions> {
        let mut options = WatchOptions {
            delay: Duration::from_millis(self.delay_ms),
            queue: self.queue,
            run_on_start: self.run_on_start,
            ..WatchOptions::default()
        };
        if !self.events.is_empty() {
            options.events = self
                .events
                .iter()
                .map(|name| name.parse::<WatchEvent>())
                .collect::<std::result::Result<_, _>>()
                .map_err(ComposeError::ConfigError)?;
        }
        Ok(options)
    }
}
