//! Sandbox shell without a model.
//!
//! Reads command lines from stdin and runs each against the sandbox, the
//! same way the `run_shell` tool does.

use super::session::{load_workspace, sync_workspace};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use vagent_core::Settings;
use vagent_tools::shared_fs;

/// Run the sandbox shell on stdin.
pub async fn run_shell(workspace: Option<PathBuf>, sync: bool) -> anyhow::Result<()> {
    let settings = Settings::load().await?.with_env();
    let dir = workspace.unwrap_or_else(|| settings.workspace_dir());
    let mut fs = load_workspace(&dir);

    let interactive = io::stdin().is_terminal();
    if interactive {
        println!("Sandbox shell on {} ({} files)", dir.display(), fs.len());
        println!("Type 'exit' to quit.");
    }

    let stdin = io::stdin();
    loop {
        if interactive {
            print!("{}$ ", fs.cwd());
            io::stdout().flush()?;
        }

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        println!("{}", fs.shell().execute(line));
    }

    if sync {
        let count = sync_workspace(&shared_fs(fs), &dir)?;
        eprintln!("Saved {} files to {}", count, dir.display());
    }
    Ok(())
}
