// src/lib.rs

pub mod cli;
pub mod compose;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod runner;
pub mod stream;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::{ComposeFile, TaskBody};
use crate::runner::Runner;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - composefile loading
/// - building and composing the task tree
/// - running the requested tasks
/// - (optional) watchers and Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.file)?;

    if args.list {
        print_task_list(&cfg);
        return Ok(());
    }

    let tasks = if args.tasks.is_empty() {
        vec![cfg.config.default_task.clone()]
    } else {
        args.tasks.clone()
    };

    if args.dry_run {
        print_dry_run(&cfg, &tasks);
        return Ok(());
    }

    let root = config_root_dir(&args.file);
    let mut gc = config::build(&cfg, &root, args.watch)?;
    let runner = gc.compose()?;

    info!(?tasks, "running tasks");
    for task in &tasks {
        if let Err(err) = runner.run(task).await {
            if !args.watch {
                return Err(err.into());
            }
            error!(task = %task, error = %err, "task failed; still watching");
        }
    }

    if args.watch {
        info!("watching for changes; press Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;
        info!("shutting down watchers");
        runner.close_watchers();
    }

    Ok(())
}

/// Directory the composefile lives in, or the current working directory
/// for a bare filename.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn print_task_list(cfg: &ComposeFile) {
    for (name, task) in &cfg.task {
        match &task.description {
            Some(description) => println!("{name}  {description}"),
            None => println!("{name}"),
        }
    }
}

/// Print the tasks that would run and every task body.
fn print_dry_run(cfg: &ComposeFile, tasks: &[String]) {
    println!("taskcompose dry-run");
    println!("  run: {}", tasks.join(" -> "));
    println!();

    println!("tasks ({}):", cfg.task.len());
    for (name, task) in &cfg.task {
        println!("  - {name}");
        match task.body() {
            Some(TaskBody::Cmd(cmd)) => println!("      cmd: {cmd}"),
            Some(TaskBody::Series(names)) => println!("      series: {names:?}"),
            Some(TaskBody::Parallel(names)) => println!("      parallel: {names:?}"),
            Some(TaskBody::Src {
                globs,
                dest,
                allow_empty,
            }) => {
                println!("      src: {globs:?}");
                if let Some(dest) = dest {
                    println!("      dest: {dest}");
                }
                if allow_empty {
                    println!("      allow_empty: true");
                }
            }
            None => {}
        }
    }

    if !cfg.watch.is_empty() {
        println!();
        println!("watchers ({}):", cfg.watch.len());
        for watch in &cfg.watch {
            println!("  - {:?} -> {:?}", watch.globs, watch.run);
            println!("      delay_ms: {}, queue: {}", watch.delay_ms, watch.queue);
            if watch.run_on_start {
                println!("      run_on_start: true");
            }
            if !watch.events.is_empty() {
                println!("      events: {:?}", watch.events);
            }
        }
    }

    debug!("dry-run complete (no execution)");
}
