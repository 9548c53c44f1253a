// src/stream/pump.rs

//! Connect a source stream and its stages end to end with one completion
//! callback.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{ComposeError, Result};
use crate::runner::{Native, TaskFn};

/// Called once per pump run: `None` on success, the failure otherwise.
pub type PumpCallback = Arc<dyn Fn(Option<&ComposeError>) + Send + Sync>;

/// Build work that drains `stages[0]` through every following stage.
///
/// The first stage must be a stream; later stages are transforms (piped) or
/// streams (merged). A failure stops the pipeline, drops whatever remains of
/// it, and is handed to `on_complete`; it does not fail the returned work.
pub fn pump(stages: Vec<Native>, on_complete: PumpCallback) -> Result<TaskFn> {
    if stages.len() < 2 {
        return Err(ComposeError::ConfigError(
            "pump requires two streams per minimum".to_string(),
        ));
    }

    let mut stages = stages.into_iter();
    let mut pipeline = match stages.next() {
        Some(Native::Stream(stream)) => stream,
        other => {
            return Err(ComposeError::NotPipeable(format!(
                "pump source ({})",
                other.as_ref().map_or("nothing", Native::kind)
            )));
        }
    };
    for stage in stages {
        pipeline = pipeline.pipe_native(stage)?;
    }

    Ok(TaskFn::new(move || {
        let pipeline = pipeline.clone();
        let on_complete = Arc::clone(&on_complete);
        async move {
            match pipeline.drain_blocking().await {
                Ok(files) => {
                    debug!(files, "pump finished");
                    on_complete(None);
                }
                Err(err) => {
                    warn!(error = %err, "pump failed");
                    on_complete(Some(&err));
                }
            }
            Ok(())
        }
    })
    .named("<pump>"))
}
