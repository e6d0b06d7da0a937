// summarize_pr tool.
// Condenses a pull request into a header, change stats, risk flags, and next steps.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::context::OracleContext;
use crate::error::Result;
use crate::github::{Params, PullFile, PullRequest};

/// Diffs above this many changed lines are flagged as large.
const LARGE_DIFF_LINES: u64 = 1500;
const CONFIG_EXTENSIONS: &[&str] = &[".yaml", ".yml", ".json"];

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizePrArgs {
    pub number: u64,
    pub owner: Option<String>,
    pub repo: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrHeader {
    pub title: Option<String>,
    pub author: Option<String>,
    pub state: Option<String>,
    pub mergeable: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrChanges {
    pub files_changed: Option<u64>,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
    pub filenames: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrSummary {
    pub header: PrHeader,
    pub changes: PrChanges,
    pub risks: Vec<String>,
    pub next_steps: Vec<String>,
}

pub async fn summarize_pr(ctx: &OracleContext, args: SummarizePrArgs) -> Result<PrSummary> {
    let repo = ctx.resolve_repo(args.owner.as_deref(), args.repo.as_deref())?;
    let pr_path = format!("{}/pulls/{}", repo.api_path(), args.number);

    let pr: PullRequest = serde_json::from_value(ctx.get(&pr_path, &Params::new()).await?)?;

    // The file list is best effort; the summary still stands without it.
    let filenames = match ctx.get(&format!("{}/files", pr_path), &Params::new()).await {
        Ok(value) => serde_json::from_value::<Vec<PullFile>>(value)?
            .into_iter()
            .map(|f| f.filename)
            .collect(),
        Err(e) => {
            warn!(pr = args.number, "could not list PR files: {}", e);
            Vec::new()
        }
    };

    Ok(summarize(pr, filenames))
}

/// Build the summary from a fetched pull request and its file names.
pub fn summarize(pr: PullRequest, filenames: Vec<String>) -> PrSummary {
    let conflicted = pr.mergeable == Some(false);
    let changed_lines = pr.additions.unwrap_or(0) + pr.deletions.unwrap_or(0);

    let mut risks = Vec::new();
    if pr.draft {
        risks.push("Draft PR".to_string());
    }
    if conflicted {
        risks.push("Merge conflicts".to_string());
    }
    if changed_lines > LARGE_DIFF_LINES {
        risks.push(format!("Large diff (>{} LOC)", LARGE_DIFF_LINES));
    }
    if filenames
        .iter()
        .any(|name| CONFIG_EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
    {
        risks.push("Config changes included".to_string());
    }

    let mut next_steps = Vec::new();
    if conflicted {
        next_steps.push("Rebase/resolve conflicts".to_string());
    }
    if pr.draft {
        next_steps.push("Mark ready for review".to_string());
    }
    if next_steps.is_empty() {
        next_steps.push("Request/collect reviews".to_string());
    }

    PrSummary {
        header: PrHeader {
            title: pr.title,
            author: pr.user.map(|u| u.login),
            state: pr.state,
            mergeable: pr.mergeable,
        },
        changes: PrChanges {
            files_changed: pr.changed_files,
            additions: pr.additions,
            deletions: pr.deletions,
            filenames,
        },
        risks,
        next_steps,
    }
}
