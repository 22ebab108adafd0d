//! vagent - sandboxed research and coding agent.
//!
//! This is the main entry point for the vagent CLI.

mod commands;

use clap::{Parser, Subcommand};
use commands::*;
use std::path::PathBuf;
use std::process::ExitCode;
use vagent_core::RunOutcome;
use vagent_util::{LogConfig, LogLevel};

#[derive(Parser)]
#[command(name = "vagent")]
#[command(author, version, about = "Sandboxed research and coding agent", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print logs to stderr instead of the log file
    #[arg(long, global = true)]
    print_logs: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single prompt to completion
    Run {
        #[command(flatten)]
        session: SessionArgs,
        /// Maximum number of model steps
        #[arg(long)]
        max_steps: Option<usize>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Stream text and tool calls as they happen
        #[arg(long)]
        stream: bool,
        /// Prompt to send (read from stdin when empty)
        #[arg(num_args = 0..)]
        prompt: Vec<String>,
    },
    /// Start an interactive session
    Chat {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Run sandbox commands without a model
    Shell {
        /// Host directory mirrored into the sandbox
        #[arg(short, long)]
        workspace: Option<PathBuf>,
        /// Write the sandbox back to the workspace on exit
        #[arg(long)]
        sync: bool,
    },
    /// List available models
    Models,
    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let _log_file = vagent_util::log::init(LogConfig {
        print: cli.print_logs,
        level: if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        },
        ..Default::default()
    });

    match cli.command {
        Commands::Run {
            session,
            max_steps,
            json,
            stream,
            prompt,
        } => {
            let outcome = run_command(RunArgs {
                session,
                max_steps,
                json,
                stream,
                prompt,
            })
            .await?;
            Ok(exit_code(outcome))
        }
        Commands::Chat { session } => {
            run_chat(session).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Shell { workspace, sync } => {
            run_shell(workspace, sync).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Models => {
            list_models();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config { command } => {
            handle_config(command).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Exit status for a finished run. Fatal errors exit with 1 through `main`.
fn exit_code(outcome: RunOutcome) -> ExitCode {
    match outcome {
        RunOutcome::Completed => ExitCode::SUCCESS,
        RunOutcome::StepLimitReached => ExitCode::from(2),
        RunOutcome::Cancelled => ExitCode::from(130),
    }
}
