// src/exec/command.rs

//! Runs a single shell command as a task function.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{ComposeError, Result};
use crate::runner::TaskFn;

/// Task function that runs `cmd` through the shell in `cwd` each time it
/// is called.
///
/// The function's display name is the command line itself.
pub fn command_fn(cmd: impl Into<String>, cwd: impl Into<PathBuf>) -> TaskFn {
    let cmd: String = cmd.into();
    let cwd: PathBuf = cwd.into();
    let display = cmd.clone();

    TaskFn::new(move || {
        let cmd = cmd.clone();
        let cwd = cwd.clone();
        async move { run_command(&cmd, &cwd).await }
    })
    .named(display)
}

/// Run `cmd` to completion. Stdout is inherited; stderr is forwarded to
/// the log at debug level. A non-zero exit is a [`ComposeError::TaskFailed`].
pub async fn run_command(cmd: &str, cwd: &Path) -> Result<()> {
    info!(cmd, cwd = %cwd.display(), "starting command");
    let started = Instant::now();

    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for command '{cmd}'"))?;

    // Consume stderr so the pipe never fills.
    let stderr_task = child.stderr.take().map(|stderr| {
        let cmd = cmd.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut last = None;
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(cmd = %cmd, "stderr: {}", line);
                last = Some(line);
            }
            last
        })
    });

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of command '{cmd}'"))?;

    let last_stderr = match stderr_task {
        Some(handle) => handle.await.ok().flatten(),
        None => None,
    };

    let code = status.code().unwrap_or(-1);
    info!(
        cmd,
        exit_code = code,
        success = status.success(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "command exited"
    );

    if status.success() {
        return Ok(());
    }

    let reason = match last_stderr {
        Some(line) => format!("exit code {code}: {line}"),
        None => format!("exit code {code}"),
    };
    Err(ComposeError::TaskFailed {
        task: cmd.to_string(),
        reason,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_command_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let task = command_fn("true", dir.path());
        assert_eq!(task.display_name(), "true");
        task.call().await.unwrap();
    }

    #[tokio::test]
    async fn failing_command_reports_exit_code_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_command("echo boom >&2; exit 3", dir.path())
            .await
            .unwrap_err();
        match err {
            ComposeError::TaskFailed { task, reason } => {
                assert_eq!(task, "echo boom >&2; exit 3");
                assert_eq!(reason, "exit code 3: boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn command_runs_in_given_directory() {
        let dir = tempfile::tempdir().unwrap();
        run_command("echo hi > out.txt", dir.path()).await.unwrap();
        let written = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert_eq!(written.trim(), "hi");
    }
}
