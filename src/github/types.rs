// GitHub API request/response types.
// Fetch outcomes, rate limit metadata, and the resource shapes the tools read.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::params::Params;

/// Maximum number of characters of an error body kept in a failure.
pub const FAILURE_MESSAGE_LIMIT: usize = 200;

/// Metadata read from response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    /// `X-RateLimit-Remaining`.
    pub rate_limit_remaining: Option<u64>,
    /// `X-RateLimit-Reset`, seconds since the epoch.
    pub rate_limit_reset: Option<i64>,
    /// Raw `Link` header.
    pub link: Option<String>,
}

impl ResponseMeta {
    /// URL of the next page, if the `Link` header advertises one.
    pub fn next_page(&self) -> Option<String> {
        let link = self.link.as_deref()?;
        link.split(',')
            .find(|part| part.contains("rel=\"next\""))
            .map(|part| {
                let part = part.trim();
                match (part.find('<'), part.find('>')) {
                    (Some(start), Some(end)) if start < end => part[start + 1..end].to_string(),
                    _ => part.to_string(),
                }
            })
    }

    pub fn rate_limit_reset_at(&self) -> Option<DateTime<Utc>> {
        self.rate_limit_reset
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Raw HTTP response as seen by the fetcher.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
    pub meta: ResponseMeta,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Successful fetch.
#[derive(Debug, Clone)]
pub struct FetchSuccess {
    pub payload: Value,
    pub served_from_cache: bool,
    /// Next page URL from the `Link` header, replayed from the cache on hits.
    pub next_page: Option<String>,
    pub rate_limit_remaining: Option<u64>,
}

impl FetchSuccess {
    pub fn has_next_page(&self) -> bool {
        self.next_page.is_some()
    }
}

/// Non-success HTTP status returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchFailure {
    pub path: String,
    pub status: u16,
    /// Response body, truncated to [`FAILURE_MESSAGE_LIMIT`] characters.
    pub message: String,
    pub rate_limit_remaining: Option<u64>,
    pub rate_limit_reset_at: Option<DateTime<Utc>>,
}

impl FetchFailure {
    pub fn from_response(path: &str, response: &RawResponse) -> Self {
        Self {
            path: path.to_string(),
            status: response.status,
            message: response.body.chars().take(FAILURE_MESSAGE_LIMIT).collect(),
            rate_limit_remaining: response.meta.rate_limit_remaining,
            rate_limit_reset_at: response.meta.rate_limit_reset_at(),
        }
    }

    /// A 403 whose body mentions the rate limit (primary or secondary).
    pub fn is_rate_limited(&self) -> bool {
        self.status == 403 && self.message.to_lowercase().contains("rate limit")
    }
}

/// Outcome of a single fetch.
#[derive(Debug, Clone)]
pub enum FetchResult {
    Success(FetchSuccess),
    Failure(FetchFailure),
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success(_))
    }

    /// Convert into a `Result`, treating a remote failure as the error.
    pub fn into_result(self) -> std::result::Result<FetchSuccess, FetchFailure> {
        match self {
            FetchResult::Success(success) => Ok(success),
            FetchResult::Failure(failure) => Err(failure),
        }
    }
}

/// Parameters for a paginated listing.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub path: String,
    pub params: Params,
    pub max_pages: u32,
    pub inter_page_delay: Duration,
}

impl PageRequest {
    pub fn new(path: impl Into<String>, params: Params, max_pages: u32) -> Self {
        Self {
            path: path.into(),
            params,
            max_pages,
            inter_page_delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.inter_page_delay = delay;
        self
    }
}

/// Outcome of a paginated listing.
#[derive(Debug, Clone)]
pub enum PageResult {
    Success { items: Vec<Value>, pages: u32 },
    Failure(FetchFailure),
}

impl PageResult {
    pub fn into_result(self) -> std::result::Result<Vec<Value>, FetchFailure> {
        match self {
            PageResult::Success { items, .. } => Ok(items),
            PageResult::Failure(failure) => Err(failure),
        }
    }
}

/// GitHub user (only the login is read).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}

/// Issue label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Issue from `/repos/{owner}/{repo}/issues`.
/// The listing also returns pull requests, flagged by `pull_request`.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub assignee: Option<User>,
    pub updated_at: Option<DateTime<Utc>>,
    pub html_url: Option<String>,
    pub pull_request: Option<Value>,
}

/// Pull request detail.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub title: Option<String>,
    pub user: Option<User>,
    pub state: Option<String>,
    pub mergeable: Option<bool>,
    #[serde(default)]
    pub draft: bool,
    pub changed_files: Option<u64>,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
}

/// Entry from `/pulls/{number}/files`.
#[derive(Debug, Clone, Deserialize)]
pub struct PullFile {
    pub filename: String,
}

/// Repository metadata (only the default branch is read).
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub default_branch: Option<String>,
}

/// Git tree listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    #[serde(default)]
    pub tree: Vec<TreeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        self.entry_type == "blob"
    }
}

/// File contents from `/contents/{path}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FileContent {
    pub encoding: Option<String>,
    pub content: Option<String>,
}

/// Result item from `/search/issues`.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueSearchItem {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub score: Option<f64>,
    pub html_url: Option<String>,
    pub pull_request: Option<Value>,
}

/// Result item from `/search/code`.
#[derive(Debug, Clone, Deserialize)]
pub struct CodeSearchItem {
    pub path: String,
    pub html_url: Option<String>,
    pub score: Option<f64>,
    pub repository: Option<CodeRepository>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeRepository {
    pub full_name: String,
}
