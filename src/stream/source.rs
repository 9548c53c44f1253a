// src/stream/source.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::errors::{ComposeError, Result};
use crate::fs::FileSystem;
use crate::runner::Native;
use crate::stream::file::VirtualFile;
use crate::stream::transform::Transform;
use crate::types::SrcOptions;
use crate::watch::patterns::{collect_matching_files, path_str, GlobMatcher};

/// Where a stream's files originally come from.
#[derive(Clone)]
enum Origin {
    Glob {
        fs: Arc<dyn FileSystem>,
        matcher: GlobMatcher,
        cwd: PathBuf,
        options: SrcOptions,
    },
    Files(Vec<VirtualFile>),
}

#[derive(Clone, Debug)]
enum Step {
    Pipe(Transform),
    /// Append another stream's files at this point.
    Merge(FileStream),
}

/// A lazily evaluated stream of files.
#[derive(Clone)]
pub struct FileStream {
    origin: Origin,
    steps: Vec<Step>,
}

impl fmt::Debug for FileStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = match &self.origin {
            Origin::Glob { matcher, .. } => format!("{matcher:?}"),
            Origin::Files(files) => format!("{} in-memory files", files.len()),
        };
        f.debug_struct("FileStream")
            .field("origin", &origin)
            .field("steps", &self.steps)
            .finish()
    }
}

impl FileStream {
    /// Stream the files selected by `matcher`.
    pub fn from_glob(
        fs: Arc<dyn FileSystem>,
        matcher: GlobMatcher,
        cwd: impl Into<PathBuf>,
        options: SrcOptions,
    ) -> Self {
        Self {
            origin: Origin::Glob {
                fs,
                matcher,
                cwd: cwd.into(),
                options,
            },
            steps: Vec::new(),
        }
    }

    /// Stream a fixed set of files.
    pub fn from_files(files: Vec<VirtualFile>) -> Self {
        Self {
            origin: Origin::Files(files),
            steps: Vec::new(),
        }
    }

    pub fn pipe(mut self, stage: Transform) -> Self {
        self.steps.push(Step::Pipe(stage));
        self
    }

    /// Append `other`'s files after everything that reached this point.
    pub fn merge(mut self, other: FileStream) -> Self {
        self.steps.push(Step::Merge(other));
        self
    }

    /// Pipe a resolved value: transforms are piped, streams merged.
    pub fn pipe_native(self, native: Native) -> Result<Self> {
        match native {
            Native::Stage(stage) => Ok(self.pipe(stage)),
            Native::Stream(stream) => Ok(self.merge(stream)),
            other => Err(ComposeError::NotPipeable(other.kind().to_string())),
        }
    }

    /// Run the stream to completion and return the files that come out of it.
    pub fn collect(self) -> Result<Vec<VirtualFile>> {
        let mut files = self.origin.load()?;
        for step in self.steps {
            match step {
                Step::Pipe(stage) => {
                    trace!(stage = stage.label(), files = files.len(), "piping files");
                    let mut next = Vec::with_capacity(files.len());
                    for file in files {
                        if let Some(out) = stage.apply(file)? {
                            next.push(out);
                        }
                    }
                    files = next;
                }
                Step::Merge(other) => files.extend(other.collect()?),
            }
        }
        Ok(files)
    }

    /// Run the stream to completion, discarding its output.
    pub fn drain(self) -> Result<usize> {
        let files = self.collect()?;
        Ok(files.len())
    }

    /// [`drain`](Self::drain) on Tokio's blocking pool, keeping filesystem
    /// I/O off the async workers.
    pub async fn drain_blocking(self) -> Result<usize> {
        tokio::task::spawn_blocking(move || self.drain())
            .await
            .map_err(|err| ComposeError::TaskFailed {
                task: "<stream>".to_string(),
                reason: err.to_string(),
            })?
    }
}

impl Origin {
    fn load(self) -> Result<Vec<VirtualFile>> {
        match self {
            Origin::Files(files) => Ok(files),
            Origin::Glob {
                fs,
                matcher,
                cwd,
                options,
            } => {
                let paths = collect_matching_files(fs.as_ref(), &matcher)?;

                if !options.allow_empty {
                    if let Some(missing) = matcher.literals().iter().find(|l| !paths.contains(l)) {
                        return Err(ComposeError::SingularGlob(path_str(missing)));
                    }
                }

                debug!(files = paths.len(), ?matcher, "source matched files");

                let mut files = Vec::with_capacity(paths.len());
                for path in paths {
                    let base = match &options.base {
                        Some(base) => cwd.join(base),
                        None => matcher
                            .base_for(&path)
                            .map(|b| b.to_path_buf())
                            .unwrap_or_else(|| cwd.clone()),
                    };
                    let contents = if options.read {
                        Some(fs.read(&path)?)
                    } else {
                        None
                    };
                    files.push(VirtualFile {
                        base,
                        path,
                        contents,
                    });
                }
                Ok(files)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread::{self, ThreadId};

    #[tokio::test]
    async fn drain_blocking_runs_stages_off_the_async_thread() {
        let seen: Arc<Mutex<Vec<ThreadId>>> = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let stream = FileStream::from_files(vec![VirtualFile::new("./src", "./src/a.txt", "a")])
            .pipe(Transform::inspect("thread", move |_| {
                recorded.lock().unwrap().push(thread::current().id());
            }));

        assert_eq!(stream.drain_blocking().await.unwrap(), 1);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_ne!(seen[0], thread::current().id());
    }
}
