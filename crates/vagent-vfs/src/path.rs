//! Sandbox path resolution.

/// Resolve `path` against `cwd` into a canonical absolute path.
///
/// Purely syntactic: no existence check. `.` and empty segments are dropped
/// and `..` pops the previous segment; popping at the root is a no-op, so the
/// result can never name anything above `/`.
pub fn resolve(path: &str, cwd: &str) -> String {
    let joined;
    let full = if path.starts_with('/') {
        path
    } else {
        joined = format!("{cwd}/{path}");
        joined.as_str()
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in full.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Prefix that every descendant key of `dir` starts with.
pub(crate) fn dir_prefix(dir: &str) -> String {
    if dir == "/" {
        "/".to_string()
    } else {
        format!("{dir}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path() {
        assert_eq!(resolve("/foo/bar", "/home/user"), "/foo/bar");
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(
            resolve("docs/readme.md", "/home/user"),
            "/home/user/docs/readme.md"
        );
    }

    #[test]
    fn test_parent_directory() {
        assert_eq!(
            resolve("../readme.md", "/home/user/docs"),
            "/home/user/readme.md"
        );
    }

    #[test]
    fn test_current_directory_dot() {
        assert_eq!(resolve("./file.txt", "/home/user"), "/home/user/file.txt");
    }

    #[test]
    fn test_multiple_parent_refs() {
        assert_eq!(
            resolve("../../file.txt", "/home/user/a/b/c"),
            "/home/user/a/file.txt"
        );
    }

    #[test]
    fn test_empty_path_is_cwd() {
        assert_eq!(resolve("", "/home/user"), "/home/user");
        assert_eq!(resolve("", "/home//user/./x/.."), "/home/user");
    }

    #[test]
    fn test_cannot_escape_root() {
        assert_eq!(resolve("..", "/"), "/");
        assert_eq!(resolve("../../../../..", "/home/user"), "/");
        assert_eq!(resolve("/../../etc/passwd", "/home/user"), "/etc/passwd");
        for depth in 1..10 {
            let path = vec![".."; depth].join("/");
            let resolved = resolve(&path, "/home/user/a");
            assert!(resolved.starts_with('/'));
            assert!(!resolved.contains(".."));
        }
    }

    #[test]
    fn test_collapses_double_slashes_and_trailing_slash() {
        assert_eq!(resolve("a//b/", "/home/user/"), "/home/user/a/b");
        assert_eq!(resolve("//", "/home/user"), "/");
    }

    #[test]
    fn test_plain_relative_paths_append_to_cwd() {
        for (path, cwd) in [
            ("a", "/"),
            ("a/b/c.txt", "/home/user"),
            ("notes.md", "/tmp"),
        ] {
            let expected = if cwd == "/" {
                format!("/{path}")
            } else {
                format!("{cwd}/{path}")
            };
            assert_eq!(resolve(path, cwd), expected);
        }
    }

    #[test]
    fn test_dir_prefix() {
        assert_eq!(dir_prefix("/"), "/");
        assert_eq!(dir_prefix("/home/user"), "/home/user/");
    }
}
