// search tool.
// Wraps the issue and code search endpoints with qualifier handling and normalized hits.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::context::OracleContext;
use crate::error::{OracleError, Result};
use crate::github::{CodeSearchItem, IssueSearchItem, PageRequest, Params};

use super::issues::per_page;

const MAX_PAGES: u32 = 3;

/// What to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Issues,
    PullRequests,
    Code,
}

impl FromStr for SearchKind {
    type Err = OracleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "issues" => Ok(SearchKind::Issues),
            "prs" => Ok(SearchKind::PullRequests),
            "code" => Ok(SearchKind::Code),
            _ => Err(OracleError::InvalidArgument(
                "type must be one of: issues | prs | code".to_string(),
            )),
        }
    }
}

fn default_kind() -> String {
    "issues".to_string()
}

fn default_limit() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub owner: Option<String>,
    pub repo: Option<String>,
}

/// A normalized search hit.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SearchHit {
    Issue {
        #[serde(rename = "type")]
        kind: &'static str,
        number: u64,
        title: String,
        state: String,
        score: Option<f64>,
        url: Option<String>,
    },
    Code {
        path: String,
        repo: Option<String>,
        url: Option<String>,
        score: Option<f64>,
    },
}

impl From<IssueSearchItem> for SearchHit {
    fn from(item: IssueSearchItem) -> Self {
        SearchHit::Issue {
            kind: if item.pull_request.is_some() { "pr" } else { "issue" },
            number: item.number,
            title: item.title,
            state: item.state,
            score: item.score,
            url: item.html_url,
        }
    }
}

impl From<CodeSearchItem> for SearchHit {
    fn from(item: CodeSearchItem) -> Self {
        SearchHit::Code {
            path: item.path,
            repo: item.repository.map(|r| r.full_name),
            url: item.html_url,
            score: item.score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub items: Vec<SearchHit>,
    pub query: String,
    pub truncated: bool,
}

/// Add the qualifiers GitHub needs for the given kind.
pub fn qualify_query(query: &str, kind: SearchKind, repo: Option<&str>) -> String {
    let mut q = query.trim().to_string();
    match kind {
        SearchKind::PullRequests => q.push_str(" is:pr"),
        SearchKind::Issues if !q.contains("is:issue") && !q.contains("is:pr") => {
            q.push_str(" is:issue")
        }
        _ => {}
    }
    if let Some(repo) = repo {
        q.push_str(&format!(" repo:{}", repo));
    }
    q
}

pub async fn search(ctx: &OracleContext, args: SearchArgs) -> Result<SearchResults> {
    let kind: SearchKind = args.kind.parse()?;

    // Scope to a repository only when one is named explicitly.
    let scoped = args.owner.as_deref().is_some_and(|o| !o.is_empty())
        || args.repo.as_deref().is_some_and(|r| !r.is_empty());
    let repo = if scoped {
        Some(ctx.resolve_repo(args.owner.as_deref(), args.repo.as_deref())?)
    } else {
        None
    };

    let query = qualify_query(&args.query, kind, repo.as_ref().map(|r| r.full_name()).as_deref());
    let path = match kind {
        SearchKind::Code => "/search/code",
        SearchKind::Issues | SearchKind::PullRequests => "/search/issues",
    };

    let params = Params::new()
        .with("q", query.as_str())
        .with("per_page", per_page(args.limit));
    let raw = ctx.get_all(&PageRequest::new(path, params, MAX_PAGES)).await?;

    let total = raw.len();
    let limit = args.limit as usize;
    let mut items = Vec::with_capacity(total.min(limit));
    for value in raw.into_iter().take(limit) {
        let hit = match kind {
            SearchKind::Code => SearchHit::from(serde_json::from_value::<CodeSearchItem>(value)?),
            _ => SearchHit::from(serde_json::from_value::<IssueSearchItem>(value)?),
        };
        items.push(hit);
    }

    Ok(SearchResults {
        count: items.len(),
        truncated: total > items.len(),
        items,
        query,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::github::testing::{ScriptedTransport, ok};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("PRs".parse::<SearchKind>().unwrap(), SearchKind::PullRequests);
        assert_eq!("code".parse::<SearchKind>().unwrap(), SearchKind::Code);
        assert!(matches!(
            "commits".parse::<SearchKind>(),
            Err(OracleError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_qualify_query() {
        assert_eq!(
            qualify_query(" crash ", SearchKind::Issues, None),
            "crash is:issue"
        );
        assert_eq!(
            qualify_query("crash is:pr", SearchKind::Issues, None),
            "crash is:pr"
        );
        assert_eq!(
            qualify_query("cache", SearchKind::PullRequests, Some("phatblat/jolt")),
            "cache is:pr repo:phatblat/jolt"
        );
        assert_eq!(
            qualify_query("fn main", SearchKind::Code, Some("a/b")),
            "fn main repo:a/b"
        );
    }

    #[tokio::test]
    async fn test_issue_search_normalizes_and_clips() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            "/search/issues",
            Some(1),
            ok(json!({"total_count": 3, "items": [
                {"number": 1, "title": "A", "state": "open", "score": 1.0, "html_url": "u1"},
                {"number": 2, "title": "B", "state": "closed", "score": 0.5,
                 "pull_request": {"url": "p"}},
                {"number": 3, "title": "C", "state": "open"}
            ]})),
        );
        let ctx = OracleContext::with_transport(Config::default(), transport.clone());
        ctx.connect_repo("ignored", "session");

        let args = SearchArgs {
            query: "A".to_string(),
            kind: "issues".to_string(),
            limit: 2,
            owner: None,
            repo: None,
        };
        let results = search(&ctx, args).await.unwrap();

        assert_eq!(results.count, 2);
        assert!(results.truncated);
        assert_eq!(results.query, "A is:issue");

        let rendered = serde_json::to_value(&results.items).unwrap();
        assert_eq!(rendered[0]["type"], "issue");
        assert_eq!(rendered[1]["type"], "pr");
        assert_eq!(rendered[1]["number"], 2);
    }

    #[tokio::test]
    async fn test_code_search_scoped_to_repo() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            "/search/code",
            Some(1),
            ok(json!({"items": [
                {"path": "src/app.rs", "html_url": "u", "score": 2.0,
                 "repository": {"full_name": "phatblat/jolt"}}
            ]})),
        );
        let ctx = OracleContext::with_transport(Config::default(), transport.clone());

        let args = SearchArgs {
            query: "Tab".to_string(),
            kind: "code".to_string(),
            limit: 10,
            owner: Some("phatblat".to_string()),
            repo: Some("jolt".to_string()),
        };
        let results = search(&ctx, args).await.unwrap();

        assert_eq!(results.query, "Tab repo:phatblat/jolt");
        assert!(!results.truncated);
        let rendered = serde_json::to_value(&results.items).unwrap();
        assert_eq!(rendered[0]["repo"], "phatblat/jolt");
        assert_eq!(transport.calls()[0].1.get("q"), Some(&json!("Tab repo:phatblat/jolt")));
    }
}
