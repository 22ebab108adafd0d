//! Import from and export to a host directory.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::VfsResult;
use crate::fs::VirtualFileSystem;
use crate::path::dir_prefix;
use crate::resolve;

impl VirtualFileSystem {
    /// Mirror every UTF-8 file under `host_dir` into the sandbox under `root`.
    ///
    /// Unreadable or non-UTF-8 files are skipped. A missing host directory
    /// loads nothing. Returns the number of files loaded.
    pub fn load_from_disk(&mut self, host_dir: &Path, root: &str) -> usize {
        if !host_dir.is_dir() {
            debug!(dir = %host_dir.display(), "Host directory missing, nothing to load");
            return 0;
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(host_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            let Ok(relative) = entry.path().strip_prefix(host_dir) else {
                continue;
            };
            let Some(relative) = relative.to_str() else {
                continue;
            };
            match fs::read_to_string(entry.path()) {
                Ok(content) => files.push((relative.to_string(), content)),
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Skipping unreadable file");
                }
            }
        }

        let count = self.load_bulk(files, &resolve(root, "/"));
        debug!(dir = %host_dir.display(), count, "Loaded files from disk");
        count
    }

    /// Write every real file under `root` back to `host_dir`.
    ///
    /// Files outside `root` and directory markers are not exported. Parent
    /// directories are created as needed. Returns the number of files written.
    pub fn save_to_disk(&self, host_dir: &Path, root: &str) -> VfsResult<usize> {
        let root = resolve(root, "/");
        let prefix = dir_prefix(&root);

        let mut count = 0;
        for (path, content) in self.files() {
            let Some(relative) = path.strip_prefix(&prefix) else {
                continue;
            };
            let target = host_dir.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, content)?;
            count += 1;
        }

        debug!(dir = %host_dir.display(), count, "Saved files to disk");
        Ok(count)
    }
}
