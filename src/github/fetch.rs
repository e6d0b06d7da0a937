// Single-request fetcher.
// Consults the response cache, issues the request, and records successful payloads.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{CacheStore, request_key};
use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::error::Result;

use super::client::Transport;
use super::params::Params;
use super::types::{FetchFailure, FetchResult, FetchSuccess};

/// Cached payload together with the continuation it arrived with, so a
/// cache hit paginates the same way the network response did.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub payload: Value,
    pub next_page: Option<String>,
}

/// Process-wide response cache.
pub type ResponseCache = CacheStore<CachedResponse>;

/// Performs one API call at a time, backed by the shared response cache.
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    cache: Arc<ResponseCache>,
    timeout: Duration,
}

impl Fetcher {
    /// Create a fetcher over `transport` using the default request timeout.
    pub fn new(transport: Arc<dyn Transport>, cache: Arc<ResponseCache>) -> Self {
        Self {
            transport,
            cache,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The response cache backing this fetcher.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Fetch `path` with `params`.
    ///
    /// With `use_cache`, a cached payload is returned without touching the
    /// network, and a fresh successful payload is stored for next time.
    /// Non-success statuses come back as [`FetchResult::Failure`] and are
    /// never cached. Connection errors, timeouts, and unparseable success
    /// bodies are `Err`.
    pub async fn fetch(&self, path: &str, params: &Params, use_cache: bool) -> Result<FetchResult> {
        let key = request_key(path, params);

        if use_cache {
            if let Some(cached) = self.cache.get(&key) {
                debug!(%key, "cache hit");
                return Ok(FetchResult::Success(FetchSuccess {
                    payload: cached.payload,
                    served_from_cache: true,
                    next_page: cached.next_page,
                    rate_limit_remaining: None,
                }));
            }
            debug!(%key, "cache miss");
        }

        let response = self.transport.get(path, params, self.timeout).await?;

        if !response.is_success() {
            let failure = FetchFailure::from_response(path, &response);
            warn!(
                path,
                status = failure.status,
                remaining = ?failure.rate_limit_remaining,
                "request failed"
            );
            return Ok(FetchResult::Failure(failure));
        }

        let payload: Value = if response.body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response.body)?
        };

        let next_page = response.meta.next_page();
        if use_cache {
            self.cache.set(
                key,
                CachedResponse {
                    payload: payload.clone(),
                    next_page: next_page.clone(),
                },
            );
        }

        Ok(FetchResult::Success(FetchSuccess {
            payload,
            served_from_cache: false,
            next_page,
            rate_limit_remaining: response.meta.rate_limit_remaining,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OracleError;
    use crate::github::testing::{ScriptedTransport, ok, ok_with_next, status};
    use serde_json::json;

    fn fetcher(transport: &Arc<ScriptedTransport>, capacity: usize) -> Fetcher {
        Fetcher::new(transport.clone(), Arc::new(CacheStore::new(capacity)))
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/repos/a/b", None, ok(json!({"default_branch": "main"})));
        let fetcher = fetcher(&transport, 8);
        let params = Params::new().with("x", 1);

        let first = fetcher.fetch("/repos/a/b", &params, true).await.unwrap();
        let FetchResult::Success(first) = first else {
            panic!("expected success");
        };
        assert!(!first.served_from_cache);
        assert_eq!(first.rate_limit_remaining, Some(4999));

        let second = fetcher.fetch("/repos/a/b", &params, true).await.unwrap();
        let FetchResult::Success(second) = second else {
            panic!("expected success");
        };
        assert!(second.served_from_cache);
        assert_eq!(second.payload, json!({"default_branch": "main"}));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_uncached_fetch_always_hits_network() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/user", None, ok(json!({"login": "octocat"})));
        let fetcher = fetcher(&transport, 8);

        fetcher.fetch("/user", &Params::new(), false).await.unwrap();
        fetcher.fetch("/user", &Params::new(), false).await.unwrap();

        assert_eq!(transport.call_count(), 2);
        assert!(fetcher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_failure_not_cached() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/repos/a/missing", None, status(404, r#"{"message":"Not Found"}"#));
        let fetcher = fetcher(&transport, 8);

        let result = fetcher.fetch("/repos/a/missing", &Params::new(), true).await.unwrap();
        let FetchResult::Failure(failure) = result else {
            panic!("expected failure");
        };
        assert_eq!(failure.status, 404);
        assert_eq!(failure.path, "/repos/a/missing");
        assert!(failure.message.contains("Not Found"));
        assert_eq!(failure.rate_limit_remaining, Some(0));
        assert!(fetcher.cache().is_empty());

        fetcher.fetch("/repos/a/missing", &Params::new(), true).await.unwrap();
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_next_page_reported() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/search/issues", Some(1), ok_with_next(json!({"items": [1]}), 2));
        let fetcher = fetcher(&transport, 8);

        let result = fetcher
            .fetch("/search/issues", &Params::new().with_page(1), true)
            .await
            .unwrap();
        let FetchResult::Success(success) = result else {
            panic!("expected success");
        };
        assert!(success.has_next_page());

        let cached = fetcher
            .fetch("/search/issues", &Params::new().with_page(1), true)
            .await
            .unwrap();
        let FetchResult::Success(cached) = cached else {
            panic!("expected success");
        };
        assert!(cached.served_from_cache);
        assert!(cached.has_next_page());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_json_is_error() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut garbage = ok(json!(null));
        garbage.body = "<html>".to_string();
        transport.respond("/broken", None, garbage);
        let fetcher = fetcher(&transport, 8);

        let result = fetcher.fetch("/broken", &Params::new(), true).await;
        assert!(matches!(result, Err(OracleError::Json(_))));
        assert!(fetcher.cache().is_empty());
    }
}
