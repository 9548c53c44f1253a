// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ComposeFile, RawComposeFile};
use crate::errors::{ComposeError, Result};

impl TryFrom<RawComposeFile> for ComposeFile {
    type Error = ComposeError;

    fn try_from(raw: RawComposeFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ComposeFile::new_unchecked(raw.config, raw.task, raw.watch))
    }
}

fn validate_raw_config(cfg: &RawComposeFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_task_bodies(cfg)?;
    validate_task_references(cfg)?;
    validate_dag(cfg)?;
    validate_watchers(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawComposeFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(ComposeError::ConfigError(
            "composefile must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_bodies(cfg: &RawComposeFile) -> Result<()> {
    for (name, task) in &cfg.task {
        let kinds = task.body_kinds();
        match kinds.len() {
            0 => {
                return Err(ComposeError::ConfigError(format!(
                    "task '{name}' needs one of `cmd`, `series`, `parallel` or `src`"
                )));
            }
            1 => {}
            _ => {
                return Err(ComposeError::ConfigError(format!(
                    "task '{name}' sets more than one body: {}",
                    kinds.join(", ")
                )));
            }
        }

        if task.src.is_none() && (task.dest.is_some() || task.allow_empty) {
            return Err(ComposeError::ConfigError(format!(
                "task '{name}' uses `dest`/`allow_empty` without `src`"
            )));
        }
        if task.src.as_ref().is_some_and(Vec::is_empty) {
            return Err(ComposeError::ConfigError(format!(
                "task '{name}' has an empty `src` list"
            )));
        }
        if task.cmd.as_deref().is_some_and(|cmd| cmd.trim().is_empty()) {
            return Err(ComposeError::ConfigError(format!(
                "task '{name}' has an empty `cmd`"
            )));
        }
    }
    Ok(())
}

fn validate_task_references(cfg: &RawComposeFile) -> Result<()> {
    for (name, task) in &cfg.task {
        for reference in task.references() {
            if !cfg.task.contains_key(reference) {
                return Err(ComposeError::ConfigError(format!(
                    "task '{name}' refers to unknown task '{reference}'"
                )));
            }
            if reference == name {
                return Err(ComposeError::ConfigError(format!(
                    "task '{name}' cannot refer to itself"
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawComposeFile) -> Result<()> {
    // Edge direction: task -> referenced task.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }
    for (name, task) in &cfg.task {
        for reference in task.references() {
            graph.add_edge(name.as_str(), reference.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(ComposeError::DagCycle(format!(
            "task references form a cycle involving '{}'",
            cycle.node_id()
        ))),
    }
}

fn validate_watchers(cfg: &RawComposeFile) -> Result<()> {
    for (index, watch) in cfg.watch.iter().enumerate() {
        if watch.globs.is_empty() {
            return Err(ComposeError::ConfigError(format!(
                "[[watch]] #{index} has no globs"
            )));
        }
        if watch.run.is_empty() {
            return Err(ComposeError::ConfigError(format!(
                "[[watch]] #{index} has nothing to run"
            )));
        }
        if let Some(unknown) = watch.run.iter().find(|name| !cfg.task.contains_key(*name)) {
            return Err(ComposeError::ConfigError(format!(
                "[[watch]] #{index} runs unknown task '{unknown}'"
            )));
        }
        watch.options()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<ComposeFile> {
        let raw: RawComposeFile = toml::from_str(toml_src)?;
        ComposeFile::try_from(raw)
    }

    #[test]
    fn accepts_forward_references() {
        let cfg = parse(
            r#"
            [task.all]
            series = ["lint", "build"]

            [task.build]
            cmd = "echo build"

            [task.lint]
            cmd = "echo lint"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.task.len(), 3);
    }

    #[test]
    fn rejects_empty_file() {
        assert!(matches!(parse(""), Err(ComposeError::ConfigError(_))));
    }

    #[test]
    fn rejects_task_without_body() {
        let err = parse(
            r#"
            [task.a]
            description = "nothing"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("needs one of"));
    }

    #[test]
    fn rejects_dest_without_src() {
        let err = parse(
            r#"
            [task.a]
            cmd = "echo"
            dest = "out"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("without `src`"));
    }

    #[test]
    fn rejects_cycles() {
        let err = parse(
            r#"
            [task.a]
            series = ["b"]

            [task.b]
            parallel = ["a"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ComposeError::DagCycle(_)));
    }

    #[test]
    fn rejects_watch_of_unknown_task() {
        let err = parse(
            r#"
            [task.a]
            cmd = "echo"

            [[watch]]
            globs = ["*.rs"]
            run = ["b"]
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown task 'b'"));
    }
}
