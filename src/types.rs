// src/types.rs

//! Option records and small value types shared by the composable layer and
//! the runner.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// One or more glob patterns.
///
/// A pattern starting with `!` is a negation: paths matching it are removed
/// from whatever the positive patterns matched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Globs(Vec<String>);

impl Globs {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(patterns.into_iter().map(Into::into).collect())
    }

    pub fn patterns(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Globs {
    fn from(pattern: &str) -> Self {
        Self(vec![pattern.to_string()])
    }
}

impl From<String> for Globs {
    fn from(pattern: String) -> Self {
        Self(vec![pattern])
    }
}

impl From<PathBuf> for Globs {
    fn from(path: PathBuf) -> Self {
        Self(vec![path.to_string_lossy().into_owned()])
    }
}

impl From<Vec<String>> for Globs {
    fn from(patterns: Vec<String>) -> Self {
        Self(patterns)
    }
}

impl From<Vec<&str>> for Globs {
    fn from(patterns: Vec<&str>) -> Self {
        Self::new(patterns)
    }
}

impl<const N: usize> From<[&str; N]> for Globs {
    fn from(patterns: [&str; N]) -> Self {
        Self::new(patterns)
    }
}

/// Options for a source stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrcOptions {
    /// Directory relative patterns are evaluated against.
    /// `None` means the runner's working directory.
    pub cwd: Option<PathBuf>,
    /// Base used to compute each file's relative path. Defaults to the
    /// non-glob prefix of the pattern that matched.
    pub base: Option<PathBuf>,
    /// Read file contents. When false, files are emitted without contents.
    pub read: bool,
    /// Accept a non-glob pattern that matches nothing.
    pub allow_empty: bool,
}

impl Default for SrcOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            base: None,
            read: true,
            allow_empty: false,
        }
    }
}

/// Options for a destination writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestOptions {
    pub cwd: Option<PathBuf>,
    /// Replace files that already exist at the target location.
    pub overwrite: bool,
}

impl Default for DestOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            overwrite: true,
        }
    }
}

/// Filesystem event kinds a watcher reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WatchEvent {
    Add,
    Change,
    Unlink,
    AddDir,
    UnlinkDir,
    /// Pseudo-event: callbacks registered for it see every event.
    All,
}

impl WatchEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchEvent::Add => "add",
            WatchEvent::Change => "change",
            WatchEvent::Unlink => "unlink",
            WatchEvent::AddDir => "addDir",
            WatchEvent::UnlinkDir => "unlinkDir",
            WatchEvent::All => "all",
        }
    }
}

impl fmt::Display for WatchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "add" => Ok(WatchEvent::Add),
            "change" => Ok(WatchEvent::Change),
            "unlink" => Ok(WatchEvent::Unlink),
            "addDir" => Ok(WatchEvent::AddDir),
            "unlinkDir" => Ok(WatchEvent::UnlinkDir),
            "all" => Ok(WatchEvent::All),
            other => Err(format!(
                "invalid watch event: {other} (expected add, change, unlink, addDir, unlinkDir or all)"
            )),
        }
    }
}

/// Options for a filesystem watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    pub cwd: Option<PathBuf>,
    /// Quiet period after the last matching event before the body runs.
    pub delay: Duration,
    /// Queue one follow-up run when events arrive while the body is running.
    /// When false such events are dropped.
    pub queue: bool,
    /// Run the body once as soon as the watcher is ready.
    pub run_on_start: bool,
    /// Event kinds that trigger the body. Event callbacks registered with
    /// `on` fire regardless of this list.
    pub events: Vec<WatchEvent>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            delay: Duration::from_millis(200),
            queue: true,
            run_on_start: false,
            events: vec![WatchEvent::Add, WatchEvent::Change, WatchEvent::Unlink],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_event_names_round_trip_through_from_str() {
        for ev in [WatchEvent::AddDir, WatchEvent::UnlinkDir, WatchEvent::All] {
            assert_eq!(ev.as_str().parse::<WatchEvent>(), Ok(ev));
        }
        assert!("rename".parse::<WatchEvent>().is_err());
    }

    #[test]
    fn globs_keep_patterns_in_given_order() {
        let globs = Globs::from(["src/**/*.rs", "!src/gen/**"]);
        assert_eq!(globs.patterns(), &["src/**/*.rs", "!src/gen/**"]);
    }
}
