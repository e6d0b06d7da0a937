// repo-oracle entry point.
// Parses CLI flags, sets up logging, and serves tool calls over stdio.

use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use repo_oracle::tools::{self, TOOL_NAMES, ToolCall};
use repo_oracle::{Config, OracleContext, OracleError, Result};

#[derive(Parser)]
#[command(name = "repo-oracle")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "GitHub issues, PRs, search, and TODO scanning for tool-calling agents", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// GitHub API base URL (overrides GITHUB_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Maximum number of cached responses (overrides REPO_ORACLE_CACHE_SIZE)
    #[arg(long, global = true)]
    cache_size: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve JSON tool calls, one per line, over stdin/stdout
    Serve,

    /// Run a single tool call and print the result
    Call {
        /// Tool name
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
    },

    /// List available tools
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries tool output, so logs go to stderr
    let log_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut config = Config::from_env()?;
    if let Some(base) = cli.api_base.as_deref() {
        config = config.with_api_base(base);
    }
    if let Some(size) = cli.cache_size {
        if size == 0 {
            return Err(OracleError::InvalidArgument(
                "--cache-size must be at least 1".to_string(),
            ));
        }
        config = config.with_cache_size(size);
    }

    match cli.command {
        Command::Tools => {
            for name in TOOL_NAMES {
                println!("{}", name);
            }
            Ok(())
        }
        Command::Call { tool, args } => {
            let ctx = OracleContext::init(config)?;
            let args: Value = match args {
                Some(raw) => serde_json::from_str(&raw)?,
                None => Value::Null,
            };
            let output = match ToolCall::from_parts(&tool, args) {
                Ok(call) => tools::dispatch(&ctx, call).await,
                Err(e) => Err(e),
            }
            .unwrap_or_else(|e| tools::error_output(&e));
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Command::Serve => serve(OracleContext::init(config)?).await,
    }
}

/// Answer one JSON tool call per input line until stdin closes.
async fn serve(ctx: OracleContext) -> Result<()> {
    info!("Tools: {}", TOOL_NAMES.join(", "));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let output = match ToolCall::parse_request(line) {
            Ok(call) => {
                debug!(?call, "tool call");
                tools::dispatch(&ctx, call).await
            }
            Err(e) => Err(e),
        }
        .unwrap_or_else(|e| tools::error_output(&e));

        let mut rendered = serde_json::to_string(&output)?;
        rendered.push('\n');
        stdout.write_all(rendered.as_bytes()).await?;
        stdout.flush().await?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}
