// list_issues tool.
// Paginates a repository's issues, dropping pull requests and clipping to the limit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::OracleContext;
use crate::error::Result;
use crate::github::{Issue, PageRequest, Params};

const MAX_PAGES: u32 = 5;

fn default_state() -> String {
    "open".to_string()
}

fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListIssuesArgs {
    pub owner: Option<String>,
    pub repo: Option<String>,
    #[serde(default = "default_state")]
    pub state: String,
    pub labels: Option<String>,
    pub assignee: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for ListIssuesArgs {
    fn default() -> Self {
        Self {
            owner: None,
            repo: None,
            state: default_state(),
            labels: None,
            assignee: None,
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueSummary {
    pub number: u64,
    pub title: String,
    pub labels: Vec<String>,
    pub state: String,
    pub assignee: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

impl From<Issue> for IssueSummary {
    fn from(issue: Issue) -> Self {
        Self {
            number: issue.number,
            title: issue.title,
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            state: issue.state,
            assignee: issue.assignee.map(|a| a.login),
            updated_at: issue.updated_at,
            url: issue.html_url,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueList {
    pub count: usize,
    pub issues: Vec<IssueSummary>,
    /// More matching issues were fetched than `limit` allowed.
    pub truncated: bool,
}

/// Page size for a requested limit, within GitHub's 1..=100 bounds.
pub fn per_page(limit: u32) -> u32 {
    limit.clamp(1, 100)
}

pub async fn list_issues(ctx: &OracleContext, args: ListIssuesArgs) -> Result<IssueList> {
    let repo = ctx.resolve_repo(args.owner.as_deref(), args.repo.as_deref())?;

    let mut params = Params::new()
        .with("state", args.state)
        .with("per_page", per_page(args.limit));
    if let Some(labels) = args.labels.filter(|l| !l.is_empty()) {
        params.insert("labels", labels);
    }
    if let Some(assignee) = args.assignee.filter(|a| !a.is_empty()) {
        params.insert("assignee", assignee);
    }

    let request = PageRequest::new(format!("{}/issues", repo.api_path()), params, MAX_PAGES);
    let raw = ctx.get_all(&request).await?;

    let mut issues = Vec::with_capacity(raw.len());
    for value in raw {
        let issue: Issue = serde_json::from_value(value)?;
        if issue.pull_request.is_none() {
            issues.push(issue);
        }
    }

    let total = issues.len();
    let clipped: Vec<IssueSummary> = issues
        .into_iter()
        .take(args.limit as usize)
        .map(IssueSummary::from)
        .collect();

    Ok(IssueList {
        count: clipped.len(),
        truncated: total > clipped.len(),
        issues: clipped,
    })
}
