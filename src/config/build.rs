// src/config/build.rs

//! Translate a validated composefile into a [`Compose`] orchestrator.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::compose::{Compose, Item};
use crate::config::model::{ComposeFile, TaskBody};
use crate::errors::{ComposeError, Result};
use crate::exec::command_fn;
use crate::fs::RealFileSystem;
use crate::runner::LocalRunner;
use crate::types::SrcOptions;

/// Populate a [`Compose`] over a [`LocalRunner`] rooted at `root` (plus
/// `[config].cwd`). Watchers are only added when `with_watchers` is set,
/// since composing starts them.
pub fn build(cfg: &ComposeFile, root: &Path, with_watchers: bool) -> Result<Compose<LocalRunner>> {
    let cwd = match &cfg.config.cwd {
        Some(dir) => root.join(dir),
        None => root.to_path_buf(),
    };
    let runner = LocalRunner::with_fs(Arc::new(RealFileSystem), cwd.clone());
    let mut gc = Compose::with_runner(Arc::new(runner));

    for (name, task) in &cfg.task {
        let body: Item = match task.body() {
            Some(TaskBody::Cmd(cmd)) => command_fn(cmd, &cwd).into(),
            Some(TaskBody::Series(names)) => gc.series(names.iter().cloned()).into(),
            Some(TaskBody::Parallel(names)) => gc.parallel(names.iter().cloned()).into(),
            Some(TaskBody::Src {
                globs,
                dest,
                allow_empty,
            }) => {
                let options = SrcOptions {
                    allow_empty,
                    ..SrcOptions::default()
                };
                let mut src = gc.src(globs.to_vec(), Some(options));
                if let Some(dest) = dest {
                    src = src.pipe(gc.dest(dest, None));
                }
                gc.func(src).into()
            }
            None => {
                return Err(ComposeError::ConfigError(format!(
                    "task '{name}' has no single body"
                )));
            }
        };
        debug!(task = %name, "adding task from composefile");
        gc.task(name.as_str(), body);
    }

    if with_watchers {
        for watch in &cfg.watch {
            let options = watch.options()?;
            gc.watch(watch.globs.clone(), Some(options), watch.run.iter().cloned());
        }
    }

    Ok(gc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::RawComposeFile;
    use crate::runner::Runner;

    fn parse(toml_src: &str) -> ComposeFile {
        let raw: RawComposeFile = toml::from_str(toml_src).unwrap();
        ComposeFile::try_from(raw).unwrap()
    }

    #[test]
    fn every_task_is_registered_on_compose() {
        let cfg = parse(
            r#"
            [task.a]
            cmd = "echo a"

            [task.b]
            series = ["a"]

            [task.c]
            src = ["*.txt"]
            dest = "out"

            [[watch]]
            globs = ["*.txt"]
            run = ["a"]
            "#,
        );
        let dir = tempfile::tempdir().unwrap();
        let mut gc = build(&cfg, dir.path(), false).unwrap();
        assert!(gc.watchers().is_empty());

        let runner = gc.compose().unwrap();
        assert_eq!(runner.task_names(), vec!["a", "b", "c"]);
        assert_eq!(runner.task("a").unwrap().display_name(), "echo a");
        assert_eq!(runner.task("c").unwrap().display_name(), "<fn>");
    }
}
