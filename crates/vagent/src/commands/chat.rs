//! Interactive chat session.
//!
//! Each line is one streamed agent run; the conversation and the sandbox
//! carry over between turns. Lines starting with `/` are commands.

use super::output::{format_outcome, spawn_printer};
use super::run::cancel_on_ctrl_c;
use super::session::{Session, SessionArgs};
use std::io::{self, BufRead, Write};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use vagent_core::{AgentConfig, AgentLoop, RunOutcome};
use vagent_provider::{Message, ModelKey, ThinkingEffort};

/// Slash commands with their usage and help text.
const COMMANDS: [(&str, &str); 7] = [
    ("/clear", "Drop the conversation and start fresh"),
    ("/files", "List files in the sandbox"),
    ("/help", "List available commands"),
    ("/model [KEY]", "Show or switch the model"),
    ("/quit", "Exit the session"),
    ("/sync", "Save the sandbox to the workspace directory"),
    ("/thinking [LEVEL]", "Show or set thinking effort (off, low, medium, high)"),
];

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Help,
    Files,
    Sync,
    Clear,
    Model(Option<String>),
    Thinking(Option<String>),
    Quit,
}

impl ChatCommand {
    /// Parse a line starting with `/`. The error is the message to show.
    pub fn parse(line: &str) -> Result<Self, String> {
        let content = line.trim().trim_start_matches('/').trim();
        if content.is_empty() {
            return Err("Type /help for available commands.".to_string());
        }

        let (name, args) = match content.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (content, ""),
        };
        let arg = (!args.is_empty()).then(|| args.to_string());

        match name.to_lowercase().as_str() {
            "help" => Ok(Self::Help),
            "files" => Ok(Self::Files),
            "sync" => Ok(Self::Sync),
            "clear" => Ok(Self::Clear),
            "model" => Ok(Self::Model(arg)),
            "thinking" => Ok(Self::Thinking(arg)),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!(
                "Unknown command: /{other}. Type /help for available commands."
            )),
        }
    }
}

/// Help listing for the slash commands.
pub fn help_text() -> String {
    let width = COMMANDS.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
    let mut lines = vec!["Available commands:".to_string()];
    for (usage, help) in COMMANDS {
        lines.push(format!("  {usage:<width$}  {help}"));
    }
    lines.push(String::new());
    lines.push("Ctrl+C cancels the current run.".to_string());
    lines.join("\n")
}

struct Chat {
    session: Session,
    history: Vec<Message>,
}

impl Chat {
    /// Handle a slash command. Returns false when the session should end.
    fn command(&mut self, command: ChatCommand) -> anyhow::Result<bool> {
        match command {
            ChatCommand::Help => println!("{}", help_text()),
            ChatCommand::Files => {
                let fs = self
                    .session
                    .fs
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                println!("{}", fs.file_summary());
            }
            ChatCommand::Sync => {
                let count = self.session.sync()?;
                println!(
                    "Saved {} files to {}",
                    count,
                    self.session.workspace.display()
                );
            }
            ChatCommand::Clear => {
                self.history.clear();
                println!("Conversation cleared.");
            }
            ChatCommand::Model(None) => {
                println!("Current model: {}", self.session.settings.model);
                let keys: Vec<&str> = ModelKey::ALL.iter().map(|k| k.as_str()).collect();
                println!("Available: {}", keys.join(", "));
            }
            ChatCommand::Model(Some(key)) => {
                let previous = self.session.settings.model;
                self.session.settings.set("model", &key)?;
                if let Err(e) = self.session.reload_model() {
                    self.session.settings.model = previous;
                    return Err(e);
                }
                println!("Switched to {}", self.session.settings.model);
            }
            ChatCommand::Thinking(None) => {
                let levels: Vec<&str> = ThinkingEffort::ALL.iter().map(|t| t.as_str()).collect();
                println!(
                    "Thinking effort: {} (one of {})",
                    self.session.settings.thinking,
                    levels.join(", ")
                );
            }
            ChatCommand::Thinking(Some(level)) => {
                let previous = self.session.settings.thinking;
                self.session.settings.set("thinking", &level)?;
                if let Err(e) = self.session.reload_model() {
                    self.session.settings.thinking = previous;
                    return Err(e);
                }
                println!("Thinking effort set to {}", self.session.settings.thinking);
            }
            ChatCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Run one streamed turn, keeping the conversation on success.
    async fn turn(&mut self, prompt: &str) -> anyhow::Result<()> {
        let config = AgentConfig::interactive()
            .with_max_steps(self.session.settings.interactive_max_steps.max(1))
            .with_system(self.session.system_prompt());

        let cancel = CancellationToken::new();
        let interrupt = cancel_on_ctrl_c(cancel.clone());
        let agent = AgentLoop::new(
            self.session.model.clone(),
            self.session.tools.clone(),
            self.session.fs.clone(),
            config,
        )
        .with_history(self.history.clone())
        .with_cancel(cancel);

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let printer = spawn_printer(rx);
        let result = agent.run_streaming(prompt, tx).await;
        let _ = printer.await;
        interrupt.abort();

        let result = result?;
        println!();
        if result.outcome != RunOutcome::Completed {
            println!("{}", format_outcome(&result));
        }
        self.history = result.messages;
        Ok(())
    }
}

/// Start an interactive session on stdin.
pub async fn run_chat(args: SessionArgs) -> anyhow::Result<()> {
    let session = Session::open(&args).await?;

    println!("vagent v{}", env!("CARGO_PKG_VERSION"));
    println!("Workspace: {}", session.workspace.display());
    println!(
        "Model: {} (thinking {})",
        session.settings.model, session.settings.thinking
    );
    println!("Type a message and press Enter. Type /help for commands.");
    println!();

    let mut chat = Chat {
        session,
        history: Vec::new(),
    };

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('/') {
            match ChatCommand::parse(line) {
                Ok(command) => match chat.command(command) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => eprintln!("Error: {e}"),
                },
                Err(message) => println!("{message}"),
            }
            continue;
        }

        if let Err(e) = chat.turn(line).await {
            error!(error = %e, "Chat turn failed");
            eprintln!("\nError: {e}");
        }
        println!();
    }

    if args.sync {
        let count = chat.session.sync()?;
        println!(
            "Saved {} files to {}",
            count,
            chat.session.workspace.display()
        );
    }
    info!("Chat session ended");
    Ok(())
}
