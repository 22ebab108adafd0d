//! System prompt generation for vagent.
//!
//! The prompt is the base instructions followed by an environment block
//! describing the sandbox as it stands when the run starts.

use vagent_vfs::VirtualFileSystem;

/// Base instructions for every model.
pub const BASE_PROMPT: &str = r#"You are vagent, a research and coding assistant working inside a sandboxed virtual terminal.

The sandbox is an in-memory filesystem rooted at /home/user. Nothing you do touches the host machine, and no host programs can be run.

# Tools
- write_file: create or overwrite a file. When asked to write code or notes, save them to a file first.
- read_file: read a file's full contents.
- run_shell: run one sandbox command. Supported: ls, pwd, cd, cat, echo (with > and >>), mkdir, touch, mv, rm, grep [-A N] [-B N] PATTERN [PATH]. Arguments are split on whitespace; quoting is not supported.
- search_papers: search the paper catalog by free text, title, abstract, author and publication date.
- get_summaries: get summaries of papers by code at low, medium or high resolution.
- fetch_paper: download a paper's full text into /home/user/papers/CODE.md, then read or grep it.

# Guidelines
- Tool results are plain text. A result starting with "Error:" means the call failed; read the message and adjust rather than repeating the same call.
- Prefer summaries over full papers unless the details matter.
- Keep answers short and concrete. Cite paper codes when you rely on a paper.
"#;

/// Describe the sandbox state for the system prompt.
pub fn environment_context(fs: &VirtualFileSystem) -> String {
    let date = chrono::Local::now().format("%a %b %d %Y").to_string();

    format!(
        r#"Here is some useful information about the environment you are running in:
<env>
  Working directory: {}
  Today's date: {}
</env>
<files>
{}
</files>"#,
        fs.cwd(),
        date,
        fs.file_summary()
    )
}

/// Build the complete system prompt.
pub fn build_system_prompt(fs: &VirtualFileSystem, custom_instructions: Option<&str>) -> String {
    let mut parts = vec![BASE_PROMPT.trim_end().to_string()];

    if let Some(custom) = custom_instructions.filter(|c| !c.trim().is_empty()) {
        parts.push(custom.to_string());
    }

    parts.push(environment_context(fs));
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_lists_files() {
        let mut fs = VirtualFileSystem::new();
        fs.write("notes.md", "hello");

        let context = environment_context(&fs);
        assert!(context.contains("Working directory: /home/user"));
        assert!(context.contains("/home/user/notes.md (5 chars)"));
    }

    #[test]
    fn test_empty_sandbox() {
        let context = environment_context(&VirtualFileSystem::new());
        assert!(context.contains("(no files)"));
    }

    #[test]
    fn test_build_with_custom_instructions() {
        let fs = VirtualFileSystem::new();
        let prompt = build_system_prompt(&fs, Some("Answer in French."));

        assert!(prompt.starts_with("You are vagent"));
        let custom = prompt.find("Answer in French.").unwrap();
        let env = prompt.find("<env>").unwrap();
        assert!(custom < env);
    }

    #[test]
    fn test_build_skips_blank_instructions() {
        let fs = VirtualFileSystem::new();
        assert_eq!(
            build_system_prompt(&fs, Some("  ")),
            build_system_prompt(&fs, None)
        );
    }
}
