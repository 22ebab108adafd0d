//! Test fixtures for creating reproducible test environments.
//!
//! Provides temporary host workspaces that can be imported into a sandbox,
//! plus a shortcut for building a filled sandbox directly.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vagent_vfs::{VirtualFileSystem, HOME};

/// A temporary host workspace with configurable file structure.
///
/// The directory is removed when the built workspace is dropped.
///
/// # Example
///
/// ```rust
/// use vagent_test_utils::fixtures::TestWorkspace;
///
/// let workspace = TestWorkspace::new()
///     .with_file("notes.md", "hello")
///     .with_file("docs/guide.md", "read me")
///     .build();
///
/// let fs = workspace.load_vfs();
/// assert_eq!(fs.read("/home/user/docs/guide.md").unwrap(), "read me");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
    /// Files to create (path relative to root -> contents).
    files: BTreeMap<PathBuf, String>,
}

impl TestWorkspace {
    /// Create a new workspace builder.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
            files: BTreeMap::new(),
        }
    }

    /// Add a file. Parent directories are created automatically.
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.files
            .insert(path.as_ref().to_path_buf(), contents.into());
        self
    }

    /// Write the files to disk.
    pub fn build(self) -> BuiltTestWorkspace {
        let root = self.temp_dir.path();
        for (path, contents) in &self.files {
            let full = root.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).expect("Failed to create parent directory");
            }
            fs::write(&full, contents).expect("Failed to write test file");
        }
        BuiltTestWorkspace {
            temp_dir: self.temp_dir,
        }
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A workspace whose files exist on disk.
pub struct BuiltTestWorkspace {
    temp_dir: TempDir,
}

impl BuiltTestWorkspace {
    /// The host directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Import the workspace into a fresh sandbox under [`HOME`].
    pub fn load_vfs(&self) -> VirtualFileSystem {
        let mut fs = VirtualFileSystem::new();
        fs.load_from_disk(self.path(), HOME);
        fs
    }

    /// Read a host file relative to the workspace root.
    pub fn read(&self, path: impl AsRef<Path>) -> String {
        let full = self.path().join(path);
        fs::read_to_string(&full)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", full.display(), e))
    }

    /// Whether a host file exists relative to the workspace root.
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.path().join(path).exists()
    }
}

/// A sandbox pre-filled with `files`, paths relative to [`HOME`].
pub fn sandbox_with<'a>(files: impl IntoIterator<Item = (&'a str, &'a str)>) -> VirtualFileSystem {
    VirtualFileSystem::with_files(files)
}
