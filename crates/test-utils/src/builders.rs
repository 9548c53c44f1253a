#![allow(dead_code)]

use std::collections::BTreeMap;

use taskcompose::config::{ComposeFile, ConfigSection, RawComposeFile, TaskConfig, WatchConfig};

/// Builder for `ComposeFile` to simplify test setup.
pub struct ComposeFileBuilder {
    config: RawComposeFile,
}

impl ComposeFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawComposeFile {
                config: ConfigSection::default(),
                task: BTreeMap::new(),
                watch: Vec::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_default_task(mut self, name: &str) -> Self {
        self.config.config.default_task = name.to_string();
        self
    }

    pub fn with_watch(mut self, globs: &[&str], run: &[&str]) -> Self {
        self.config.watch.push(WatchConfig {
            globs: globs.iter().map(|g| g.to_string()).collect(),
            run: run.iter().map(|r| r.to_string()).collect(),
            delay_ms: 50,
            queue: true,
            run_on_start: false,
            events: Vec::new(),
        });
        self
    }

    pub fn build_raw(self) -> RawComposeFile {
        self.config
    }

    pub fn build(self) -> ComposeFile {
        ComposeFile::try_from(self.config).expect("Failed to build valid composefile from builder")
    }
}

impl Default for ComposeFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
#[derive(Default)]
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn cmd(cmd: &str) -> Self {
        Self::default().with_cmd(cmd)
    }

    pub fn series(names: &[&str]) -> Self {
        let mut builder = Self::default();
        builder.task.series = Some(names.iter().map(|n| n.to_string()).collect());
        builder
    }

    pub fn parallel(names: &[&str]) -> Self {
        let mut builder = Self::default();
        builder.task.parallel = Some(names.iter().map(|n| n.to_string()).collect());
        builder
    }

    pub fn src(globs: &[&str]) -> Self {
        let mut builder = Self::default();
        builder.task.src = Some(globs.iter().map(|g| g.to_string()).collect());
        builder
    }

    pub fn with_cmd(mut self, cmd: &str) -> Self {
        self.task.cmd = Some(cmd.to_string());
        self
    }

    pub fn dest(mut self, dir: &str) -> Self {
        self.task.dest = Some(dir.to_string());
        self
    }

    pub fn allow_empty(mut self) -> Self {
        self.task.allow_empty = true;
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.task.description = Some(text.to_string());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
