// GitHub API HTTP transport.
// Handles authentication headers, timeouts, and rate limit header extraction.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK, USER_AGENT},
};

use crate::config::Config;
use crate::error::{OracleError, Result};

use super::params::Params;
use super::types::{RawResponse, ResponseMeta};

const GITHUB_API_VERSION: &str = "2022-11-28";

/// Issues GET requests against the API.
///
/// Non-success statuses are returned as responses, not errors; only
/// connection failures and timeouts are `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, params: &Params, timeout: Duration) -> Result<RawResponse>;
}

/// reqwest-backed transport for GitHub.com or GitHub Enterprise.
pub struct GitHubTransport {
    client: Client,
    base: String,
}

impl GitHubTransport {
    /// Create a transport for `base`, authenticating when a token is given.
    pub fn new(base: &str, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| OracleError::Other(e.to_string()))?,
            );
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("repo-oracle"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(OracleError::Http)?;

        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// Create a transport from the API base and token in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_base, config.token.as_deref())
    }

    /// API base URL without a trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }
}

#[async_trait]
impl Transport for GitHubTransport {
    async fn get(&self, path: &str, params: &Params, timeout: Duration) -> Result<RawResponse> {
        let url = format!("{}{}", self.base, path);
        let response = self
            .client
            .get(&url)
            .query(&params.to_query())
            .timeout(timeout)
            .send()
            .await
            .map_err(OracleError::Http)?;

        let status = response.status().as_u16();
        let meta = response_meta(&response);
        let body = response.text().await.map_err(OracleError::Http)?;

        Ok(RawResponse { status, body, meta })
    }
}

/// Read rate limit and pagination headers.
fn response_meta(response: &Response) -> ResponseMeta {
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    ResponseMeta {
        rate_limit_remaining: header("x-ratelimit-remaining").and_then(|v| v.parse().ok()),
        rate_limit_reset: header("x-ratelimit-reset").and_then(|v| v.parse().ok()),
        link: header(LINK.as_str()),
    }
}
