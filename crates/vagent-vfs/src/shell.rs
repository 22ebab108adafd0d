//! A minimal shell over the virtual filesystem.
//!
//! A command line is parsed into a [`Command`] and then executed against one
//! [`VirtualFileSystem`]. Every outcome, including failures, comes back as
//! text; errors are prefixed with `Error:`.

use tracing::debug;

use crate::error::{VfsError, VfsResult};
use crate::fs::VirtualFileSystem;
use crate::grep::GrepOptions;

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ls(Option<String>),
    Pwd,
    Cd(String),
    Rm(String),
    Grep(GrepOptions),
    Cat(String),
    Echo {
        text: String,
        redirect: Option<Redirect>,
    },
    Mkdir(String),
    Touch(String),
    Mv { from: String, to: String },
}

/// Output redirection of `echo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    pub append: bool,
}

impl Command {
    /// Parse a command line.
    ///
    /// The first whitespace-separated token is the verb. Arguments are split
    /// on whitespace only; there is no quoting.
    pub fn parse(line: &str) -> VfsResult<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        if verb.is_empty() {
            return Err(VfsError::usage("No command given"));
        }

        let args: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
        let first = || args.first().cloned();

        match verb {
            "ls" => Ok(Self::Ls(first())),
            "pwd" => Ok(Self::Pwd),
            "cd" => Ok(Self::Cd(first().unwrap_or_else(|| ".".to_string()))),
            "rm" => first()
                .map(Self::Rm)
                .ok_or_else(|| VfsError::missing("rm", "a path")),
            "cat" => first()
                .map(Self::Cat)
                .ok_or_else(|| VfsError::missing("cat", "a path")),
            "mkdir" => first()
                .map(Self::Mkdir)
                .ok_or_else(|| VfsError::missing("mkdir", "a path")),
            "touch" => first()
                .map(Self::Touch)
                .ok_or_else(|| VfsError::missing("touch", "a path")),
            "mv" => match args.as_slice() {
                [from, to] => Ok(Self::Mv {
                    from: from.clone(),
                    to: to.clone(),
                }),
                _ => Err(VfsError::usage(
                    "mv requires exactly two paths (source and destination)",
                )),
            },
            "grep" => parse_grep(&args).map(Self::Grep),
            "echo" => parse_echo(rest),
            other => Err(VfsError::NotImplemented(other.to_string())),
        }
    }
}

fn parse_grep(args: &[String]) -> VfsResult<GrepOptions> {
    let mut options = GrepOptions::default();
    let mut iter = args.iter().peekable();

    while let Some(flag) = iter.next_if(|a| a.as_str() == "-A" || a.as_str() == "-B") {
        let value = iter.next().map(String::as_str).unwrap_or("");
        let n: usize = value
            .parse()
            .map_err(|_| VfsError::invalid_flag(flag.as_str(), value))?;
        if flag == "-A" {
            options.after = n;
        } else {
            options.before = n;
        }
    }

    options.pattern = iter
        .next()
        .cloned()
        .ok_or_else(|| VfsError::missing("grep", "a pattern"))?;
    options.path = iter.next().cloned();
    if iter.next().is_some() {
        return Err(VfsError::usage("grep accepts a pattern and at most one path"));
    }
    Ok(options)
}

/// `echo TEXT`, `echo TEXT > PATH` or `echo TEXT >> PATH`.
///
/// The split happens on the last `>` so the text itself may not contain one.
fn parse_echo(rest: &str) -> VfsResult<Command> {
    let Some((left, path)) = rest.rsplit_once('>') else {
        return Ok(Command::Echo {
            text: strip_quotes(rest).to_string(),
            redirect: None,
        });
    };

    let (left, append) = match left.strip_suffix('>') {
        Some(left) => (left, true),
        None => (left, false),
    };
    let path = strip_quotes(path.trim());
    if path.is_empty() {
        return Err(VfsError::missing("echo redirection", "a target path"));
    }

    Ok(Command::Echo {
        text: strip_quotes(left.trim()).to_string(),
        redirect: Some(Redirect {
            path: path.to_string(),
            append,
        }),
    })
}

fn strip_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Executes commands against one filesystem.
pub struct Shell<'a> {
    fs: &'a mut VirtualFileSystem,
}

impl<'a> Shell<'a> {
    pub fn new(fs: &'a mut VirtualFileSystem) -> Self {
        Self { fs }
    }

    /// Parse and execute a command line, rendering errors as text.
    pub fn execute(&mut self, line: &str) -> String {
        debug!(command = %line, "Executing shell command");
        match Command::parse(line).and_then(|cmd| self.run(cmd)) {
            Ok(output) => output,
            Err(e) => e.to_tool_text(),
        }
    }

    /// Execute an already parsed command.
    pub fn run(&mut self, command: Command) -> VfsResult<String> {
        match command {
            Command::Ls(path) => Ok(self.fs.list_dir(path.as_deref())),
            Command::Pwd => Ok(self.fs.cwd().to_string()),
            Command::Cd(path) => Ok(self.fs.change_dir(&path)),
            Command::Rm(path) => self.fs.delete(&path),
            Command::Grep(options) => self.fs.grep(&options),
            Command::Cat(path) => self.fs.read(&path),
            Command::Echo { text, redirect } => match redirect {
                None => Ok(text),
                Some(Redirect { path, append }) => {
                    let content = if append {
                        let mut existing = self.fs.get(&path).unwrap_or_default().to_string();
                        if !existing.is_empty() && !existing.ends_with('\n') {
                            existing.push('\n');
                        }
                        existing + &text
                    } else {
                        text
                    };
                    Ok(self.fs.write(&path, content))
                }
            },
            Command::Mkdir(path) => Ok(self.fs.make_dir(&path)),
            Command::Touch(path) => Ok(self.fs.touch(&path)),
            Command::Mv { from, to } => self.fs.rename(&from, &to),
        }
    }
}

impl VirtualFileSystem {
    /// Borrow this filesystem as a shell.
    pub fn shell(&mut self) -> Shell<'_> {
        Shell::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grep_flags() {
        let cmd = Command::parse("grep -A 2 -B 1 foo docs").unwrap();
        assert_eq!(
            cmd,
            Command::Grep(GrepOptions::new("foo").path("docs").after(2).before(1))
        );
    }

    #[test]
    fn test_parse_grep_flags_any_order() {
        let cmd = Command::parse("grep -B 3 -A 0 foo").unwrap();
        assert_eq!(cmd, Command::Grep(GrepOptions::new("foo").before(3)));
    }

    #[test]
    fn test_parse_grep_no_quoting() {
        let err = Command::parse("grep \"two words\" notes.md").unwrap_err();
        assert!(matches!(err, VfsError::Usage(_)));
    }

    #[test]
    fn test_grep_bad_flag_value_names_flag() {
        let err = Command::parse("grep -A x foo").unwrap_err();
        assert!(err.to_string().contains("-A"));
        let err = Command::parse("grep -B").unwrap_err();
        assert!(err.to_string().contains("-B"));
    }

    #[test]
    fn test_grep_requires_pattern() {
        let mut fs = VirtualFileSystem::new();
        assert_eq!(fs.shell().execute("grep"), "Error: grep requires a pattern");
    }

    #[test]
    fn test_unknown_verb() {
        let mut fs = VirtualFileSystem::new();
        let out = fs.shell().execute("wget http://example.com");
        assert!(out.starts_with("Error:"));
        assert!(out.contains("not implemented"));
    }

    #[test]
    fn test_python_is_not_available() {
        let mut fs = VirtualFileSystem::new();
        assert!(fs.shell().execute("python script.py").contains("not implemented"));
    }

    #[test]
    fn test_empty_command() {
        let mut fs = VirtualFileSystem::new();
        assert!(fs.shell().execute("   ").starts_with("Error:"));
    }

    #[test]
    fn test_pwd_cd_ls() {
        let mut fs = VirtualFileSystem::with_files([("docs/a.md", "x")]);
        let mut sh = fs.shell();
        assert_eq!(sh.execute("pwd"), "/home/user");
        assert_eq!(sh.execute("ls"), "(empty directory)");
        assert_eq!(sh.execute("cd docs"), "Changed directory to /home/user/docs");
        assert_eq!(sh.execute("ls"), "a.md");
        assert_eq!(sh.execute("cd"), "Changed directory to /home/user/docs");
        assert_eq!(sh.execute("cd .."), "Changed directory to /home/user");
    }

    #[test]
    fn test_rm_then_cat() {
        let mut fs = VirtualFileSystem::with_files([("a.txt", "x")]);
        let mut sh = fs.shell();
        assert_eq!(sh.execute("rm a.txt"), "Deleted /home/user/a.txt");
        assert!(sh.execute("cat a.txt").contains("does not exist"));
        assert!(sh.execute("rm").starts_with("Error:"));
    }

    #[test]
    fn test_echo_redirect() {
        let mut fs = VirtualFileSystem::new();
        let mut sh = fs.shell();
        assert_eq!(sh.execute("echo hello"), "hello");
        assert_eq!(
            sh.execute("echo 'hi there' > out.txt"),
            "Successfully wrote 8 chars to /home/user/out.txt"
        );
        sh.execute("echo again >> out.txt");
        assert_eq!(sh.execute("cat out.txt"), "hi there\nagain");
        assert!(sh.execute("echo x >").starts_with("Error:"));
    }

    #[test]
    fn test_mkdir_touch_mv() {
        let mut fs = VirtualFileSystem::new();
        let mut sh = fs.shell();
        assert_eq!(sh.execute("mkdir sub"), "Created directory /home/user/sub");
        assert_eq!(sh.execute("touch sub/a.txt"), "Touched /home/user/sub/a.txt");
        assert_eq!(sh.execute("ls sub"), "a.txt");
        assert_eq!(
            sh.execute("mv sub/a.txt b.txt"),
            "Moved /home/user/sub/a.txt to /home/user/b.txt"
        );
        assert!(sh.execute("mv ghost.txt c.txt").contains("does not exist"));
        assert!(sh.execute("mv only-one").starts_with("Error:"));
    }

    #[test]
    fn test_grep_context_through_shell() {
        let mut fs = VirtualFileSystem::with_files([("/f.txt", "a\nmatch\nb\nc\nd\ne\nf\nmatch\ng\nh")]);
        let out = fs.shell().execute("grep -A 1 -B 1 match /f.txt");
        assert_eq!(out.lines().filter(|l| *l == "--").count(), 1);
        assert!(out.contains("/f.txt:2:match"));
        assert!(out.contains("/f.txt:3-b"));
    }

    #[test]
    fn test_invalid_regex_through_shell() {
        let mut fs = VirtualFileSystem::with_files([("a.txt", "x")]);
        assert!(fs
            .shell()
            .execute("grep ( a.txt")
            .starts_with("Error: Invalid regex pattern"));
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut fs = VirtualFileSystem::new();
        fs.write("notes.md", "hi");
        assert!(fs.list_dir(Some("/home/user")).lines().any(|l| l == "notes.md"));

        let mut sh = fs.shell();
        assert_eq!(sh.execute("grep hi"), "/home/user/notes.md:1:hi");
        assert_eq!(sh.execute("rm notes.md"), "Deleted /home/user/notes.md");

        let err = fs.read("notes.md").unwrap_err();
        assert!(err.to_tool_text().contains("does not exist"));
    }
}
