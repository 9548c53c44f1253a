// src/runner/registry.rs

//! Task registry with forward references.
//!
//! Names are bound lazily: a reference to a task can be created before the
//! task is registered, and is only looked up when the referencing work runs.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Dfs;
use tracing::{debug, warn};

use crate::errors::{ComposeError, Result};
use crate::runner::work::TaskFn;

#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: Arc<RwLock<BTreeMap<String, TaskFn>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing any previous binding.
    pub fn set(&self, name: &str, task: TaskFn) {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        if tasks.insert(name.to_string(), task).is_some() {
            warn!(task = name, "task registered twice; keeping the latest definition");
        } else {
            debug!(task = name, "task registered");
        }
    }

    pub fn get(&self, name: &str) -> Option<TaskFn> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        tasks.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        tasks.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);
        tasks.keys().cloned().collect()
    }

    /// A task function that runs whatever is bound to `name` at call time.
    pub fn reference(&self, name: &str) -> TaskFn {
        let registry = self.clone();
        let target = name.to_string();

        TaskFn::new(move || {
            let lookup = registry
                .get(&target)
                .ok_or_else(|| ComposeError::TaskNotFound(target.clone()));
            async move { lookup?.call().await }
        })
        .named(name)
        .with_references(vec![name.to_string()])
    }

    /// Wrap `task` so every call first checks the tasks it references for
    /// cycles, the same way a named run does.
    pub fn guarded(&self, task: TaskFn) -> TaskFn {
        let registry = self.clone();
        let display_name = task.display_name().to_string();
        let references = task.references().to_vec();
        let inner = task;

        TaskFn::new(move || {
            let check = inner
                .references()
                .iter()
                .try_for_each(|name| registry.check_acyclic(name));
            let inner = inner.clone();
            async move {
                check?;
                inner.call().await
            }
        })
        .named(display_name)
        .with_references(references)
    }

    /// Fail with [`ComposeError::DagCycle`] if following references from
    /// `root` can lead back to a task already on the path.
    pub fn check_acyclic(&self, root: &str) -> Result<()> {
        let tasks = self.tasks.read().unwrap_or_else(PoisonError::into_inner);

        // Edge direction: task -> referenced task.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for (name, task) in tasks.iter() {
            graph.add_node(name.as_str());
            for target in task.references() {
                graph.add_edge(name.as_str(), target.as_str(), ());
            }
        }

        if !graph.contains_node(root) {
            return Ok(());
        }

        // Only the part of the graph reachable from `root` matters.
        let mut reachable: DiGraphMap<&str, ()> = DiGraphMap::new();
        let mut dfs = Dfs::new(&graph, root);
        while let Some(node) = dfs.next(&graph) {
            reachable.add_node(node);
            for target in graph.neighbors(node) {
                reachable.add_edge(node, target, ());
            }
        }

        match toposort(&reachable, None) {
            Ok(_order) => Ok(()),
            Err(cycle) => Err(ComposeError::DagCycle(format!(
                "cycle detected in task references involving task '{}' (reached from '{}')",
                cycle.node_id(),
                root
            ))),
        }
    }
}
