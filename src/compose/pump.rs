// src/compose/pump.rs

use std::fmt;
use std::sync::Arc;

use crate::compose::{resolve_all, Item};
use crate::errors::{ComposeError, Result};
use crate::runner::{Native, Runner};
use crate::stream::{pump, PumpCallback};

/// Stream stages connected end to end, with one completion callback.
#[derive(Clone)]
pub struct Pump {
    stages: Vec<Item>,
    on_complete: PumpCallback,
}

impl fmt::Debug for Pump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pump")
            .field("stages", &self.stages)
            .finish_non_exhaustive()
    }
}

impl Pump {
    pub fn new<I, F>(stages: I, on_complete: F) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Item>,
        F: Fn(Option<&ComposeError>) + Send + Sync + 'static,
    {
        Self {
            stages: stages.into_iter().map(Into::into).collect(),
            on_complete: Arc::new(on_complete),
        }
    }

    pub fn stages(&self) -> &[Item] {
        &self.stages
    }

    pub fn resolve<R: Runner>(&self, runner: &Arc<R>) -> Result<Native> {
        let stages = resolve_all(runner, &self.stages)?;
        Ok(Native::Work(pump(stages, Arc::clone(&self.on_complete))?))
    }
}
