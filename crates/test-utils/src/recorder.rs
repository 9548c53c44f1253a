use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskcompose::errors::ComposeError;
use taskcompose::runner::TaskFn;

/// Shared log of task invocations.
///
/// Every task function handed out records its label when it runs, so tests
/// can assert on ordering and counts.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A task that records `label` and succeeds.
    pub fn task(&self, label: &str) -> TaskFn {
        let log = self.clone();
        let label = label.to_string();
        TaskFn::from_sync(move || {
            log.push(&label);
            Ok(())
        })
    }

    /// A task that records `label` and fails with `reason`.
    pub fn failing(&self, label: &str, reason: &str) -> TaskFn {
        let log = self.clone();
        let label = label.to_string();
        let reason = reason.to_string();
        TaskFn::from_sync(move || {
            log.push(&label);
            Err(ComposeError::TaskFailed {
                task: label.clone(),
                reason: reason.clone(),
            })
        })
    }

    /// A task that records `start:<label>`, sleeps, then records
    /// `end:<label>`.
    pub fn slow(&self, label: &str, delay: Duration) -> TaskFn {
        let log = self.clone();
        let label = label.to_string();
        TaskFn::new(move || {
            let log = log.clone();
            let label = label.clone();
            async move {
                log.push(&format!("start:{label}"));
                tokio::time::sleep(delay).await;
                log.push(&format!("end:{label}"));
                Ok(())
            }
        })
    }

    pub fn push(&self, label: &str) {
        self.entries.lock().unwrap().push(label.to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, label: &str) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.as_str() == label)
            .count()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}
