#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use taskcompose::compose::Compose;
use taskcompose::fs::mock::MockFileSystem;
use taskcompose::runner::LocalRunner;

pub use taskcompose_test_utils::{init_tracing, with_timeout, CallLog};

/// A `Compose` whose runner reads and writes an in-memory filesystem
/// rooted at `"."`.
pub fn mock_compose() -> (Compose<LocalRunner>, MockFileSystem) {
    let fs = MockFileSystem::new();
    let runner = LocalRunner::with_fs(Arc::new(fs.clone()), ".");
    (Compose::with_runner(Arc::new(runner)), fs)
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}

/// Poll `cond` every 20ms until it holds or five seconds pass.
pub async fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..250 {
        if cond() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    cond()
}
