// src/compose/mod.rs

//! Deferred, tree-shaped descriptions of runner operations.
//!
//! Callers build a tree of [`Composable`] nodes (usually through the
//! [`Compose`] orchestrator) and nothing touches the runner until the tree is
//! resolved. Resolution walks the tree depth-first; every composite node
//! accepts [`Item`]s, which are either nested composables or values the
//! runner already understands (task functions, task names, pipe stages).

pub mod dest;
pub mod function;
pub mod orchestrator;
pub mod pump;
pub mod series;
pub mod src;
pub mod task;
pub mod watch;

use std::sync::Arc;

use crate::errors::Result;
use crate::runner::{Native, Runner, TaskFn};
use crate::stream::Transform;

pub use dest::Dest;
pub use function::Function;
pub use orchestrator::Compose;
pub use pump::Pump;
pub use series::{Parallel, Series};
pub use src::Src;
pub use task::Task;
pub use watch::Watch;

/// A child of a composite node.
#[derive(Debug, Clone)]
pub enum Item {
    /// A plain task function.
    Fn(TaskFn),
    /// A task referenced by name; may be registered later.
    Ref(String),
    /// A plain pipe stage.
    Stage(Transform),
    /// A nested tree, resolved together with its parent.
    Composable(Box<Composable>),
}

/// Every node kind a tree can contain.
#[derive(Debug, Clone)]
pub enum Composable {
    Series(Series),
    Parallel(Parallel),
    Src(Src),
    Dest(Dest),
    Watch(Watch),
    Pump(Pump),
    Function(Function),
    Task(Task),
}

impl Composable {
    /// Turn this node (and transitively its children) into the runner's own
    /// construct.
    pub fn resolve<R: Runner>(&self, runner: &Arc<R>) -> Result<Native> {
        match self {
            Composable::Series(node) => node.resolve(runner),
            Composable::Parallel(node) => node.resolve(runner),
            Composable::Src(node) => node.resolve(runner),
            Composable::Dest(node) => node.resolve(runner),
            Composable::Watch(node) => node.resolve(runner),
            Composable::Pump(node) => node.resolve(runner),
            Composable::Function(node) => node.resolve(runner),
            Composable::Task(node) => node.resolve(runner),
        }
    }

    /// Task names referenced anywhere in this tree.
    pub fn references(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references(&self, out: &mut Vec<String>) {
        let items: Vec<&Item> = match self {
            Composable::Series(node) => node.children().iter().collect(),
            Composable::Parallel(node) => node.children().iter().collect(),
            Composable::Src(node) => node.pipes().iter().collect(),
            Composable::Watch(node) => node.body().iter().collect(),
            Composable::Pump(node) => node.stages().iter().collect(),
            Composable::Function(node) => vec![node.inner()],
            Composable::Task(node) => {
                push_unique(out, node.name());
                return;
            }
            Composable::Dest(_) => Vec::new(),
        };
        for item in items {
            match item {
                Item::Ref(name) => push_unique(out, name),
                Item::Composable(nested) => nested.collect_references(out),
                Item::Fn(task) => {
                    for name in task.references() {
                        push_unique(out, name);
                    }
                }
                Item::Stage(_) => {}
            }
        }
    }
}

fn push_unique(out: &mut Vec<String>, name: &str) {
    if !out.iter().any(|n| n == name) {
        out.push(name.to_string());
    }
}

/// Resolve `item` if it is a nested composable; hand every other value to
/// the runner unchanged.
pub fn resolve_if_composable<R: Runner>(runner: &Arc<R>, item: &Item) -> Result<Native> {
    match item {
        Item::Composable(node) => node.resolve(runner),
        Item::Fn(task) => Ok(Native::Work(task.clone())),
        Item::Ref(name) => Ok(Native::Ref(name.clone())),
        Item::Stage(stage) => Ok(Native::Stage(stage.clone())),
    }
}

pub(crate) fn resolve_all<R: Runner>(runner: &Arc<R>, items: &[Item]) -> Result<Vec<Native>> {
    items
        .iter()
        .map(|item| resolve_if_composable(runner, item))
        .collect()
}

impl From<TaskFn> for Item {
    fn from(task: TaskFn) -> Self {
        Item::Fn(task)
    }
}

impl From<&str> for Item {
    fn from(name: &str) -> Self {
        Item::Ref(name.to_string())
    }
}

impl From<String> for Item {
    fn from(name: String) -> Self {
        Item::Ref(name)
    }
}

impl From<Transform> for Item {
    fn from(stage: Transform) -> Self {
        Item::Stage(stage)
    }
}

impl From<Composable> for Item {
    fn from(node: Composable) -> Self {
        Item::Composable(Box::new(node))
    }
}

macro_rules! composable_variant {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Composable {
                fn from(node: $variant) -> Self {
                    Composable::$variant(node)
                }
            }

            impl From<$variant> for Item {
                fn from(node: $variant) -> Self {
                    Item::Composable(Box::new(Composable::$variant(node)))
                }
            }
        )*
    };
}

composable_variant!(Series, Parallel, Src, Dest, Watch, Pump, Function, Task);
