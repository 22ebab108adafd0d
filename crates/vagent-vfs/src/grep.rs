//! Regex search over the filesystem with context lines.
//!
//! Output lines use the familiar grep layout: `path:N:line` for matches,
//! `path:N-line` for context, and `--` between non-adjacent groups within
//! one file.

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::VfsResult;
use crate::fs::VirtualFileSystem;
use crate::path::dir_prefix;

/// Maximum number of output lines returned by one search.
pub const MAX_OUTPUT_LINES: usize = 100;

/// Parameters of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrepOptions {
    pub pattern: String,
    /// File or directory to search; the working directory when unset.
    pub path: Option<String>,
    /// Lines of context after each match (`-A`).
    pub after: usize,
    /// Lines of context before each match (`-B`).
    pub before: usize,
}

impl GrepOptions {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Default::default()
        }
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn after(mut self, n: usize) -> Self {
        self.after = n;
        self
    }

    pub fn before(mut self, n: usize) -> Self {
        self.before = n;
        self
    }

    /// Set both `before` and `after` (`-C`).
    pub fn context(self, n: usize) -> Self {
        self.before(n).after(n)
    }
}

impl VirtualFileSystem {
    /// Search file contents for a regular expression.
    ///
    /// When the target path names a file only that file is searched,
    /// otherwise every file under it. An invalid pattern is an error; no
    /// match is a normal result.
    pub fn grep(&self, options: &GrepOptions) -> VfsResult<String> {
        let regex = Regex::new(&options.pattern)?;
        let target = self.resolve(options.path.as_deref().unwrap_or("."));

        let mut output = Vec::new();
        if let Some(content) = self.get(&target) {
            search_file(&target, content, &regex, options, &mut output);
        } else {
            let prefix = dir_prefix(&target);
            for (path, content) in self.files() {
                if path.starts_with(&prefix) {
                    search_file(path, content, &regex, options, &mut output);
                }
            }
        }

        if output.is_empty() {
            return Ok(format!(
                "No matches found for pattern '{}'",
                options.pattern
            ));
        }

        if output.len() > MAX_OUTPUT_LINES {
            let total = output.len();
            output.truncate(MAX_OUTPUT_LINES);
            return Ok(format!(
                "Found {total} lines, showing first {MAX_OUTPUT_LINES}:\n{}",
                output.join("\n")
            ));
        }

        Ok(output.join("\n"))
    }
}

fn search_file(
    path: &str,
    content: &str,
    regex: &Regex,
    options: &GrepOptions,
    output: &mut Vec<String>,
) {
    let lines: Vec<&str> = content.lines().collect();
    let matches: BTreeSet<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| regex.is_match(line))
        .map(|(i, _)| i)
        .collect();

    if matches.is_empty() {
        return;
    }

    let mut shown = BTreeSet::new();
    for &m in &matches {
        let start = m.saturating_sub(options.before);
        let end = (m + options.after).min(lines.len() - 1);
        shown.extend(start..=end);
    }

    let mut previous: Option<usize> = None;
    for i in shown {
        if previous.is_some_and(|p| i > p + 1) {
            output.push("--".to_string());
        }
        let sep = if matches.contains(&i) { ':' } else { '-' };
        output.push(format!("{path}:{}{sep}{}", i + 1, lines[i]));
        previous = Some(i);
    }
}
