//! Command-line entry: flags, tracing setup and the shell loop

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use cmdmod_core::{CommandRegistry, CommandSource};
use is_terminal::IsTerminal as _;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::{
    commands::{self, ShellState},
    config::{load_config, resolve_config_path},
    console::ConsoleSource,
};

/// Name the console user dispatches commands as
pub const CONSOLE_NAME: &str = "console";

#[derive(Debug, Parser)]
#[command(name = "cmdmod")]
#[command(version, about = "Interactive shell for the bettermodel command tree")]
pub struct Cli {
    /// Config file to load instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run a single command and exit
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    pub command: Option<String>,

    /// Permission granted to the console user (repeatable, replaces the configured set)
    #[arg(long = "permission", value_name = "NODE")]
    pub permissions: Vec<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Initialize the tracing subscriber, logging to stderr
///
/// # Errors
///
/// Returns error if a global subscriber is already installed
pub fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}

/// Load config, register the command tree and run one command or the REPL
///
/// # Errors
///
/// Returns error if the config cannot be loaded, a `--command` line fails,
/// or stdin cannot be read
pub async fn run(cli: Cli) -> Result<()> {
    let config_path = resolve_config_path(cli.config.as_deref());
    let config = load_config(config_path.as_deref()).await?;
    debug!(path = ?config_path, "configuration loaded");

    let permissions = if cli.permissions.is_empty() {
        config.permissions.clone()
    } else {
        cli.permissions
    };
    let color = !cli.no_color && std::io::stdout().is_terminal();
    let source: Arc<dyn CommandSource> =
        Arc::new(ConsoleSource::new(CONSOLE_NAME, permissions, color));

    let state = Arc::new(ShellState::new(&config, config_path));
    let mut registry = CommandRegistry::new();
    commands::register(&mut registry, &state, &config.help);
    debug!(registrations = registry.len(), "command tree registered");

    let outcome = match cli.command {
        Some(line) => registry
            .execute(Arc::clone(&source), &line)
            .map_err(anyhow::Error::from),
        None => repl(&registry, &source).await,
    };
    state.wait_for_reloads().await;
    outcome
}

/// Read commands from stdin until EOF or `exit`
async fn repl(registry: &CommandRegistry, source: &Arc<dyn CommandSource>) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if interactive {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "exit" | "quit" => break,
            _ => {}
        }
        if let Err(e) = registry.execute(Arc::clone(source), line) {
            source.warn(&e.to_string());
        }
    }
    Ok(())
}
