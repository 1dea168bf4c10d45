//! Sandcoder CLI - entry point.
//!
//! `sandcoder [--verbose] [--workspace DIR] [--config FILE] <prompt...>`
//!
//! Runs one request through the agent loop and prints the final answer.
//! Exits with status 1 on a missing prompt, the iteration cap, or a fatal
//! error.

mod helpers;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use sandcoder_agent::{AgentLoop, AgentLoopConfig, Sandbox, Termination, ToolDispatcher, ToolRegistry};
use sandcoder_core::config::{load_config, Config};
use sandcoder_core::utils::expand_home;
use sandcoder_providers::http_provider::create_provider;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Sandcoder - AI coding agent confined to a working directory
#[derive(Parser, Debug)]
#[command(name = "sandcoder", version, about, long_about = None)]
struct Cli {
    /// The request for the agent (all words are joined)
    prompt: Vec<String>,

    /// Echo the prompt, token counts, and each tool result
    #[arg(long, default_value_t = false)]
    verbose: bool,

    /// Working directory the tools are confined to (overrides config)
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    /// Path to the config file (default: ~/.sandcoder/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn prompt_text(&self) -> Option<String> {
        let prompt = self.prompt.join(" ");
        let prompt = prompt.trim();
        if prompt.is_empty() {
            None
        } else {
            Some(prompt.to_string())
        }
    }
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(prompt) = cli.prompt_text() else {
        helpers::print_usage();
        return Ok(ExitCode::FAILURE);
    };

    let mut config = load_config(cli.config.as_deref());
    if let Some(workspace) = &cli.workspace {
        config.agent.workspace = workspace.to_string_lossy().into_owned();
    }

    let agent_loop = build_agent_loop(&config, cli.verbose)?;
    if cli.verbose {
        helpers::print_prompt(&prompt);
    }

    info!(model = agent_loop.model(), "processing request");
    let outcome = agent_loop.run(&prompt).await.context("agent processing failed")?;

    if cli.verbose {
        helpers::print_usage_summary(&outcome.usage, outcome.iterations);
    }

    match &outcome.termination {
        Termination::Completed { answer } => {
            helpers::print_response(answer);
            Ok(ExitCode::SUCCESS)
        }
        Termination::IterationCapReached => {
            helpers::print_iteration_cap(agent_loop.config().max_iterations);
            Ok(ExitCode::FAILURE)
        }
    }
}

// ─────────────────────────────────────────────
// Wiring
// ─────────────────────────────────────────────

/// Build an `AgentLoop` from the loaded configuration.
fn build_agent_loop(config: &Config, verbose: bool) -> Result<AgentLoop> {
    let workspace = expand_home(&config.agent.workspace);
    let sandbox = Sandbox::new(&workspace)?;

    let provider = create_provider(&config.provider, &config.agent.model)?;

    let registry = ToolRegistry::with_defaults(&config.tools);
    let dispatcher = ToolDispatcher::new(registry, sandbox);

    Ok(AgentLoop::new(
        Arc::new(provider),
        dispatcher,
        AgentLoopConfig::from_config(config, verbose),
    ))
}

/// Initialize tracing/logging on stderr.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("sandcoder=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
