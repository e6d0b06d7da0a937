// Tool layer.
// Argument parsing, dispatch, and normalized JSON output for each tool.

pub mod issues;
pub mod pulls;
pub mod search;
pub mod todos;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::context::OracleContext;
use crate::error::{OracleError, Result};

pub use issues::{ListIssuesArgs, list_issues};
pub use pulls::{SummarizePrArgs, summarize_pr};
pub use search::{SearchArgs, search};
pub use todos::{FindTodosArgs, find_todos};

/// Names accepted by [`ToolCall`], in the order they are advertised.
pub const TOOL_NAMES: &[&str] = &[
    "connect_repo",
    "list_issues",
    "summarize_pr",
    "find_todos",
    "search",
    "health_check",
];

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectRepoArgs {
    pub owner: String,
    pub repo: String,
}

/// Wire form of a tool invocation: `{"tool": "<name>", "args": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolRequest {
    pub tool: String,
    #[serde(default)]
    pub args: Value,
}

/// A parsed tool invocation.
#[derive(Debug, Clone)]
pub enum ToolCall {
    ConnectRepo(ConnectRepoArgs),
    ListIssues(ListIssuesArgs),
    SummarizePr(SummarizePrArgs),
    FindTodos(FindTodosArgs),
    Search(SearchArgs),
    HealthCheck,
}

impl ToolCall {
    /// Build a call from a tool name and its JSON arguments. Missing
    /// arguments are treated as an empty object.
    pub fn from_parts(tool: &str, args: Value) -> Result<Self> {
        let args = if args.is_null() { json!({}) } else { args };
        let call = match tool {
            "connect_repo" => ToolCall::ConnectRepo(serde_json::from_value(args)?),
            "list_issues" => ToolCall::ListIssues(serde_json::from_value(args)?),
            "summarize_pr" => ToolCall::SummarizePr(serde_json::from_value(args)?),
            "find_todos" => ToolCall::FindTodos(serde_json::from_value(args)?),
            "search" => ToolCall::Search(serde_json::from_value(args)?),
            "health_check" => ToolCall::HealthCheck,
            other => {
                return Err(OracleError::InvalidArgument(format!(
                    "unknown tool {:?}, expected one of: {}",
                    other,
                    TOOL_NAMES.join(", ")
                )));
            }
        };
        Ok(call)
    }

    /// Parse one request line.
    pub fn parse_request(line: &str) -> Result<Self> {
        let request: ToolRequest = serde_json::from_str(line)?;
        Self::from_parts(&request.tool, request.args)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub has_token: bool,
    pub cached_keys: usize,
}

pub fn health_check(ctx: &OracleContext) -> HealthReport {
    let has_token = ctx.config().has_token();
    HealthReport {
        status: if has_token { "ok" } else { "degraded" },
        has_token,
        cached_keys: ctx.fetcher().cache().len(),
    }
}

/// Run a tool and serialize its output.
pub async fn dispatch(ctx: &OracleContext, call: ToolCall) -> Result<Value> {
    let output = match call {
        ToolCall::ConnectRepo(args) => {
            ctx.connect_repo(&args.owner, &args.repo);
            json!({"connected": true, "owner": args.owner, "repo": args.repo})
        }
        ToolCall::ListIssues(args) => serde_json::to_value(list_issues(ctx, args).await?)?,
        ToolCall::SummarizePr(args) => serde_json::to_value(summarize_pr(ctx, args).await?)?,
        ToolCall::FindTodos(args) => serde_json::to_value(find_todos(ctx, args).await?)?,
        ToolCall::Search(args) => serde_json::to_value(search(ctx, args).await?)?,
        ToolCall::HealthCheck => serde_json::to_value(health_check(ctx))?,
    };
    Ok(output)
}

/// Render an error as the JSON object returned to the caller.
pub fn error_output(error: &OracleError) -> Value {
    match error {
        OracleError::Remote(failure) => json!({
            "error": format!("{}: {}", failure.status, failure.message),
            "path": failure.path,
            "status": failure.status,
            "ratelimit-remaining": failure.rate_limit_remaining,
            "ratelimit-reset": failure.rate_limit_reset_at,
        }),
        other => json!({"error": other.to_string()}),
    }
}
