//! Sandboxed virtual filesystem for vagent.
//!
//! This crate provides the in-memory filesystem the agent works in:
//! - Path resolution that can never escape the sandbox root
//! - A flat path -> content map with directories inferred from prefixes
//! - A grep engine with context lines
//! - A tiny shell (`ls`, `pwd`, `cd`, `rm`, `grep`, ...) over the filesystem
//! - Import from and export to a host directory
//!
//! Every operation is synchronous and in-memory. Callers that share one
//! filesystem between tasks are responsible for serializing access.

pub mod disk;
pub mod error;
pub mod fs;
pub mod grep;
pub mod path;
pub mod shell;

pub use error::{VfsError, VfsResult};
pub use fs::VirtualFileSystem;
pub use grep::GrepOptions;
pub use path::resolve;
pub use shell::{Command, Shell};

/// Home directory of the sandbox; the initial working directory.
pub const HOME: &str = "/home/user";

/// File name of the empty marker that keeps an otherwise empty directory alive.
pub const DIR_MARKER: &str = ".dir";

/// Whether a key is a directory marker rather than real content.
pub fn is_dir_marker(path: &str) -> bool {
    path.rsplit('/').next() == Some(DIR_MARKER)
}
