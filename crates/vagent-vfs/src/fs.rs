//! The in-memory filesystem.
//!
//! Files live in a flat map keyed by absolute path. Directories are never
//! stored: a directory exists exactly when some key has it as a prefix.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{VfsError, VfsResult};
use crate::path::{dir_prefix, resolve};
use crate::{is_dir_marker, DIR_MARKER, HOME};

/// Flat path -> content store plus a working directory.
///
/// Keys are always the output of [`resolve`], so they are absolute and
/// normalized. Iteration order is lexicographic, which keeps `ls`, `grep`
/// and exports deterministic.
#[derive(Debug, Clone)]
pub struct VirtualFileSystem {
    files: BTreeMap<String, String>,
    cwd: String,
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFileSystem {
    /// Create an empty filesystem with the working directory at [`HOME`].
    pub fn new() -> Self {
        Self {
            files: BTreeMap::new(),
            cwd: HOME.to_string(),
        }
    }

    /// Create a filesystem pre-populated with `files`, resolved against [`HOME`].
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: Into<String>,
    {
        let mut fs = Self::new();
        fs.load_bulk(files, HOME);
        fs
    }

    /// Current working directory.
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// Resolve a path against the current working directory.
    pub fn resolve(&self, path: &str) -> String {
        resolve(path, &self.cwd)
    }

    /// Number of stored entries, directory markers included.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether a file exists at `path`.
    pub fn exists(&self, path: &str) -> bool {
        self.files.contains_key(&self.resolve(path))
    }

    /// Borrow the content of a file without copying.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(&self.resolve(path)).map(String::as_str)
    }

    /// Iterate over real files (markers excluded) in path order.
    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files
            .iter()
            .filter(|(path, _)| !is_dir_marker(path))
            .map(|(path, content)| (path.as_str(), content.as_str()))
    }

    /// Copy of the whole map, markers included.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.files.clone()
    }

    /// Create or overwrite a file.
    ///
    /// Always succeeds. The reported size is in characters.
    pub fn write(&mut self, path: &str, content: impl Into<String>) -> String {
        let resolved = self.resolve(path);
        let content = content.into();
        let chars = content.chars().count();
        debug!(path = %resolved, chars, "Writing file");
        self.files.insert(resolved.clone(), content);
        format!("Successfully wrote {chars} chars to {resolved}")
    }

    /// Read the full content of a file.
    pub fn read(&self, path: &str) -> VfsResult<String> {
        let resolved = self.resolve(path);
        self.files
            .get(&resolved)
            .cloned()
            .ok_or(VfsError::NotFound(resolved))
    }

    /// Remove exactly one file. Directories are not removed recursively.
    pub fn delete(&mut self, path: &str) -> VfsResult<String> {
        let resolved = self.resolve(path);
        match self.files.remove(&resolved) {
            Some(_) => {
                debug!(path = %resolved, "Deleted file");
                Ok(format!("Deleted {resolved}"))
            }
            None => Err(VfsError::NotFound(resolved)),
        }
    }

    /// List the files directly inside a directory, one name per line.
    ///
    /// Only keys whose remainder after the directory prefix has no `/` are
    /// listed, so nested files and subdirectories never appear. An unknown
    /// or empty directory yields `(empty directory)`.
    pub fn list_dir(&self, path: Option<&str>) -> String {
        let target = self.resolve(path.unwrap_or("."));
        let prefix = dir_prefix(&target);

        let entries: Vec<&str> = self
            .files
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty() && !rest.contains('/') && *rest != DIR_MARKER)
            .collect();

        if entries.is_empty() {
            "(empty directory)".to_string()
        } else {
            entries.join("\n")
        }
    }

    /// Change the working directory.
    ///
    /// Directories need not exist; only the path is validated.
    pub fn change_dir(&mut self, path: &str) -> String {
        self.cwd = self.resolve(path);
        format!("Changed directory to {}", self.cwd)
    }

    /// Create a directory by writing an empty marker file inside it.
    pub fn make_dir(&mut self, path: &str) -> String {
        let resolved = self.resolve(path);
        let marker = format!("{}{DIR_MARKER}", dir_prefix(&resolved));
        self.files.entry(marker).or_default();
        format!("Created directory {resolved}")
    }

    /// Create an empty file if it does not exist. Existing content is kept.
    pub fn touch(&mut self, path: &str) -> String {
        let resolved = self.resolve(path);
        self.files.entry(resolved.clone()).or_default();
        format!("Touched {resolved}")
    }

    /// Move a single file.
    pub fn rename(&mut self, from: &str, to: &str) -> VfsResult<String> {
        let src = self.resolve(from);
        let dst = self.resolve(to);
        let content = self
            .files
            .remove(&src)
            .ok_or_else(|| VfsError::NotFound(src.clone()))?;
        self.files.insert(dst.clone(), content);
        Ok(format!("Moved {src} to {dst}"))
    }

    /// Insert many files at once, resolving each path against `root`.
    ///
    /// Returns how many entries were stored.
    pub fn load_bulk<I, P, C>(&mut self, files: I, root: &str) -> usize
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: Into<String>,
    {
        let mut count = 0;
        for (path, content) in files {
            self.files.insert(resolve(path.as_ref(), root), content.into());
            count += 1;
        }
        count
    }

    /// Multi-line summary of the files, used in system prompts.
    pub fn file_summary(&self) -> String {
        let lines: Vec<String> = self
            .files()
            .map(|(path, content)| format!("- {path} ({} chars)", content.chars().count()))
            .collect();
        if lines.is_empty() {
            "(no files)".to_string()
        } else {
            lines.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_starts_at_home() {
        let fs = VirtualFileSystem::new();
        assert_eq!(fs.cwd(), HOME);
        assert!(fs.is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let mut fs = VirtualFileSystem::new();
        let msg = fs.write("notes.md", "hi");
        assert_eq!(msg, "Successfully wrote 2 chars to /home/user/notes.md");
        assert_eq!(fs.read("/home/user/notes.md").unwrap(), "hi");
        assert_eq!(fs.read("./notes.md").unwrap(), "hi");
    }

    #[test]
    fn test_empty_content_round_trips() {
        let mut fs = VirtualFileSystem::new();
        assert_eq!(
            fs.write("empty.txt", ""),
            "Successfully wrote 0 chars to /home/user/empty.txt"
        );
        assert_eq!(fs.read("empty.txt").unwrap(), "");
        assert_eq!(fs.list_dir(None), "empty.txt");
    }

    #[test]
    fn test_multiline_content_round_trips() {
        let content = "first\n\n  indented\nlast\n";
        let mut fs = VirtualFileSystem::new();
        fs.write("doc.md", content);
        assert_eq!(fs.read("doc.md").unwrap(), content);
    }

    #[test]
    fn test_write_counts_chars_not_bytes() {
        let mut fs = VirtualFileSystem::new();
        let msg = fs.write("u.txt", "héllo");
        assert!(msg.starts_with("Successfully wrote 5 chars"));
    }

    #[test]
    fn test_write_overwrites() {
        let mut fs = VirtualFileSystem::new();
        fs.write("a.txt", "one");
        fs.write("a.txt", "two");
        assert_eq!(fs.read("a.txt").unwrap(), "two");
        assert_eq!(fs.len(), 1);
    }

    #[test]
    fn test_read_missing() {
        let fs = VirtualFileSystem::new();
        let err = fs.read("nope.txt").unwrap_err();
        assert!(matches!(err, VfsError::NotFound(ref p) if p == "/home/user/nope.txt"));
        assert!(err.to_tool_text().contains("does not exist"));
    }

    #[test]
    fn test_delete_then_read() {
        let mut fs = VirtualFileSystem::with_files([("a.txt", "x")]);
        assert_eq!(fs.delete("a.txt").unwrap(), "Deleted /home/user/a.txt");
        let err = fs.read("a.txt").unwrap_err();
        assert!(err.to_string().contains("/home/user/a.txt"));
    }

    #[test]
    fn test_delete_missing_names_path() {
        let mut fs = VirtualFileSystem::new();
        let err = fs.delete("ghost.txt").unwrap_err();
        assert!(err.to_string().contains("/home/user/ghost.txt"));
    }

    #[test]
    fn test_delete_is_not_recursive() {
        let mut fs = VirtualFileSystem::with_files([("dir/a.txt", "x")]);
        assert!(fs.delete("dir").is_err());
        assert!(fs.exists("dir/a.txt"));
    }

    #[test]
    fn test_list_dir_children() {
        let fs = VirtualFileSystem::with_files([
            ("/a/x.txt", ""),
            ("/a/b/y.txt", ""),
            ("/a/b/z.txt", ""),
        ]);
        assert_eq!(fs.list_dir(Some("/a")), "x.txt");
        assert_eq!(fs.list_dir(Some("/a/b")), "y.txt\nz.txt");
    }

    #[test]
    fn test_list_dir_omits_nested_entries() {
        let fs = VirtualFileSystem::with_files([("docs/a.md", "x")]);
        assert_eq!(fs.list_dir(None), "(empty directory)");
        assert_eq!(fs.list_dir(Some("docs")), "a.md");
    }

    #[test]
    fn test_list_dir_is_prefix_exact() {
        let fs = VirtualFileSystem::with_files([("/ab/x.txt", ""), ("/a/y.txt", "")]);
        assert_eq!(fs.list_dir(Some("/a")), "y.txt");
    }

    #[test]
    fn test_list_dir_empty() {
        let fs = VirtualFileSystem::new();
        assert_eq!(fs.list_dir(None), "(empty directory)");
        assert_eq!(fs.list_dir(Some("/nowhere")), "(empty directory)");
    }

    #[test]
    fn test_list_root() {
        let fs = VirtualFileSystem::with_files([("/home/user/a.txt", ""), ("/top.txt", "")]);
        assert_eq!(fs.list_dir(Some("/")), "top.txt");
    }

    #[test]
    fn test_change_dir_does_not_require_existence() {
        let mut fs = VirtualFileSystem::new();
        assert_eq!(fs.change_dir("work"), "Changed directory to /home/user/work");
        assert_eq!(fs.cwd(), "/home/user/work");
        fs.write("a.txt", "x");
        assert!(fs.exists("/home/user/work/a.txt"));
        fs.change_dir("../..");
        assert_eq!(fs.cwd(), "/home");
    }

    #[test]
    fn test_make_dir_marker_is_hidden() {
        let mut fs = VirtualFileSystem::new();
        assert_eq!(fs.make_dir("sub"), "Created directory /home/user/sub");
        assert!(fs.exists("sub/.dir"));
        assert_eq!(fs.list_dir(None), "(empty directory)");
        assert_eq!(fs.list_dir(Some("sub")), "(empty directory)");
        assert_eq!(fs.files().count(), 0);
    }

    #[test]
    fn test_touch_keeps_content() {
        let mut fs = VirtualFileSystem::with_files([("a.txt", "keep")]);
        assert_eq!(fs.touch("a.txt"), "Touched /home/user/a.txt");
        assert_eq!(fs.read("a.txt").unwrap(), "keep");
        fs.touch("b.txt");
        assert_eq!(fs.read("b.txt").unwrap(), "");
    }

    #[test]
    fn test_rename() {
        let mut fs = VirtualFileSystem::with_files([("a.txt", "x")]);
        assert_eq!(
            fs.rename("a.txt", "b/c.txt").unwrap(),
            "Moved /home/user/a.txt to /home/user/b/c.txt"
        );
        assert!(!fs.exists("a.txt"));
        assert_eq!(fs.read("b/c.txt").unwrap(), "x");
        assert!(fs.rename("a.txt", "d.txt").is_err());
    }

    #[test]
    fn test_load_bulk_resolves_against_root() {
        let mut fs = VirtualFileSystem::new();
        let count = fs.load_bulk([("a.txt", "1"), ("sub/b.txt", "2")], "/data");
        assert_eq!(count, 2);
        assert_eq!(fs.read("/data/sub/b.txt").unwrap(), "2");
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut fs = VirtualFileSystem::with_files([("a.txt", "1")]);
        let snap = fs.snapshot();
        fs.write("a.txt", "2");
        assert_eq!(snap.get("/home/user/a.txt").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_file_summary() {
        let mut fs = VirtualFileSystem::new();
        assert_eq!(fs.file_summary(), "(no files)");
        fs.write("a.txt", "abc");
        fs.make_dir("d");
        assert_eq!(fs.file_summary(), "- /home/user/a.txt (3 chars)");
    }
}
