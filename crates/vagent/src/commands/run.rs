//! Run command handler.
//!
//! Executes a single prompt in non-interactive mode and reports the answer,
//! the tool trace and the outcome.

use super::output::{format_result, format_outcome, spawn_printer};
use super::session::{Session, SessionArgs};
use std::io::{self, Read};
use tokio_util::sync::CancellationToken;
use tracing::info;
use vagent_core::{AgentConfig, AgentLoop, RunOutcome};

/// Arguments of `vagent run`.
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub session: SessionArgs,
    pub max_steps: Option<usize>,
    pub json: bool,
    pub stream: bool,
    pub prompt: Vec<String>,
}

/// Join the prompt words, reading stdin when none were given.
fn read_prompt(words: Vec<String>) -> anyhow::Result<String> {
    if !words.is_empty() {
        return Ok(words.join(" "));
    }
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    Ok(input.trim().to_string())
}

/// Cancel the token on Ctrl+C.
pub fn cancel_on_ctrl_c(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling run");
            cancel.cancel();
        }
    })
}

/// Run a single prompt to completion.
pub async fn run_command(args: RunArgs) -> anyhow::Result<RunOutcome> {
    let prompt = read_prompt(args.prompt)?;
    if prompt.is_empty() {
        anyhow::bail!("No prompt provided");
    }

    let session = Session::open(&args.session).await?;
    let max_steps = args.max_steps.unwrap_or(session.settings.max_steps).max(1);
    let config = AgentConfig::default()
        .with_max_steps(max_steps)
        .with_system(session.system_prompt());

    let cancel = CancellationToken::new();
    let interrupt = cancel_on_ctrl_c(cancel.clone());
    let agent = AgentLoop::new(
        session.model.clone(),
        session.tools.clone(),
        session.fs.clone(),
        config,
    )
    .with_cancel(cancel);

    let result = if args.stream && !args.json {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let printer = spawn_printer(rx);
        let result = agent.run_streaming(&prompt, tx).await;
        let _ = printer.await;
        result
    } else {
        agent.run(&prompt).await
    };
    interrupt.abort();
    let result = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if args.stream {
        println!();
        println!();
        println!("{}", format_outcome(&result));
    } else {
        println!("{}", format_result(&result));
    }

    if args.session.sync {
        let count = session.sync()?;
        eprintln!("Saved {} files to {}", count, session.workspace.display());
    }

    Ok(result.outcome)
}
