// src/stream/dest.rs

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::fs::FileSystem;
use crate::stream::transform::Transform;
use crate::types::DestOptions;
use crate::watch::patterns::path_str;

/// Stage that writes every file under `out_dir` (keeping its path relative
/// to its base) and passes the relocated file downstream.
pub fn dest_writer(fs: Arc<dyn FileSystem>, out_dir: PathBuf, options: DestOptions) -> Transform {
    let label = format!("dest({})", path_str(&out_dir));

    Transform::new(label, move |mut file| {
        let target = out_dir.join(file.relative());

        match &file.contents {
            Some(_) if !options.overwrite && fs.exists(&target) => {
                debug!(target = %path_str(&target), "dest: file exists, not overwriting");
            }
            Some(contents) => {
                trace!(target = %path_str(&target), bytes = contents.len(), "dest: writing file");
                fs.write(&target, contents)?;
            }
            None => {
                debug!(target = %path_str(&target), "dest: file has no contents, skipping write");
            }
        }

        file.base = out_dir.clone();
        file.path = target;
        Ok(Some(file))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::stream::VirtualFile;

    #[test]
    fn keeps_existing_files_when_overwrite_is_off() {
        let fs = MockFileSystem::new();
        fs.add_file("./out/a.txt", "old");

        let options = DestOptions {
            overwrite: false,
            ..DestOptions::default()
        };
        let stage = dest_writer(Arc::new(fs.clone()), PathBuf::from("./out"), options);

        let out = stage
            .apply(VirtualFile::new("./src", "./src/a.txt", "new"))
            .unwrap()
            .unwrap();

        assert_eq!(out.path, PathBuf::from("./out/a.txt"));
        assert_eq!(fs.contents("./out/a.txt"), Some(b"old".to_vec()));
    }
}
