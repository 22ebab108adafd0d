//! Custom assertion helpers for common test patterns.
//!
//! Provides macros and functions for making test assertions more readable
//! and providing better error messages.

use std::path::Path;
use vagent_vfs::VirtualFileSystem;

/// Assert that a host file contains specific text.
///
/// # Example
///
/// ```rust
/// use vagent_test_utils::assertions::assert_file_contains;
/// use std::fs;
/// use tempfile::TempDir;
///
/// let dir = TempDir::new().unwrap();
/// let path = dir.path().join("test.txt");
/// fs::write(&path, "Hello, world!").unwrap();
///
/// assert_file_contains(&path, "Hello");
/// ```
pub fn assert_file_contains(path: &Path, expected: &str) {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));

    assert!(
        content.contains(expected),
        "File {} does not contain expected text.\nExpected to find: {}\nActual content:\n{}",
        path.display(),
        expected,
        content
    );
}

/// Assert that a sandbox file holds exactly `expected`.
pub fn assert_vfs_file(fs: &VirtualFileSystem, path: &str, expected: &str) {
    match fs.read(path) {
        Ok(actual) => assert_strings_equal(&actual, expected),
        Err(e) => panic!("Expected sandbox file {path}: {e}"),
    }
}

/// Assert that two strings are equal, with a nice diff on failure.
pub fn assert_strings_equal(actual: &str, expected: &str) {
    if actual != expected {
        let diff = similar::TextDiff::from_lines(expected, actual);
        let mut output = String::new();

        for change in diff.iter_all_changes() {
            let sign = match change.tag() {
                similar::ChangeTag::Delete => "-",
                similar::ChangeTag::Insert => "+",
                similar::ChangeTag::Equal => " ",
            };
            output.push_str(&format!("{}{}", sign, change));
        }

        panic!("Strings are not equal.\nDiff:\n{}", output);
    }
}

/// Assert that a result is Ok and extract the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Assert that a result is Err.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => e,
        }
    };
}

/// Assert that a string contains a substring (with better error messages).
#[macro_export]
macro_rules! assert_str_contains {
    ($haystack:expr, $needle:expr) => {
        if !$haystack.contains($needle) {
            panic!(
                "String does not contain expected substring.\nExpected to find: {}\nIn string:\n{}",
                $needle, $haystack
            );
        }
    };
}
