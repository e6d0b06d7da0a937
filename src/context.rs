// Process-wide oracle context.
// Owns the response cache, fetcher, paginator, and the session's selected repository.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::info;

use crate::config::Config;
use crate::error::{OracleError, Result};
use crate::github::{
    Fetcher, GitHubTransport, PageRequest, Paginator, Params, ResponseCache, RetryPolicy,
    Transport,
};

/// Repository selected by `connect_repo`.
#[derive(Debug, Clone, Default)]
struct Session {
    owner: Option<String>,
    repo: Option<String>,
}

/// Fully resolved `owner/repo` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    /// `/repos/{owner}/{repo}` prefix for repository endpoints.
    pub fn api_path(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.repo)
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Shared state for every tool call: created once at startup, dropped at exit.
pub struct OracleContext {
    config: Config,
    fetcher: Arc<Fetcher>,
    paginator: Paginator,
    session: Mutex<Session>,
}

impl OracleContext {
    /// Build the context against the real GitHub API.
    pub fn init(config: Config) -> Result<Self> {
        let transport = GitHubTransport::from_config(&config)?;
        info!(
            base = %config.api_base,
            cache_size = config.cache_size,
            authenticated = config.has_token(),
            "repo oracle initialised"
        );
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Build the context on top of any transport.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        let cache = Arc::new(ResponseCache::new(config.cache_size));
        let fetcher =
            Arc::new(Fetcher::new(transport, cache).with_timeout(config.request_timeout));
        let paginator = Paginator::new(fetcher.clone())
            .with_retry(RetryPolicy::rate_limit(config.retry_backoff));

        Self {
            config,
            fetcher,
            paginator,
            session: Mutex::new(Session::default()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    /// Remember a default repository for later calls.
    pub fn connect_repo(&self, owner: &str, repo: &str) {
        let mut session = self.session.lock();
        session.owner = Some(owner.to_string());
        session.repo = Some(repo.to_string());
    }

    /// Resolve owner and repo, each falling back to the session when not given.
    pub fn resolve_repo(&self, owner: Option<&str>, repo: Option<&str>) -> Result<RepoRef> {
        let session = self.session.lock();
        let owner = non_empty(owner).or(session.owner.as_deref());
        let repo = non_empty(repo).or(session.repo.as_deref());

        match (owner, repo) {
            (Some(owner), Some(repo)) => Ok(RepoRef {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(OracleError::NoRepo),
        }
    }

    /// Cached GET; a remote failure becomes [`OracleError::Remote`].
    pub async fn get(&self, path: &str, params: &Params) -> Result<Value> {
        let result = self.fetcher.fetch(path, params, true).await?;
        Ok(result.into_result()?.payload)
    }

    /// Paginated GET; a remote failure becomes [`OracleError::Remote`].
    pub async fn get_all(&self, request: &PageRequest) -> Result<Vec<Value>> {
        let result = self.paginator.fetch_all(request).await?;
        Ok(result.into_result()?)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
