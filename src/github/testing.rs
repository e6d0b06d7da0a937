// Scripted transport for tests.
// Replays canned responses per path and page, recording every request made.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::Result;

use super::client::Transport;
use super::params::Params;
use super::types::{RawResponse, ResponseMeta};

/// In-memory transport. Each route holds a queue of responses; the last
/// response in a queue repeats for any further calls. Unscripted routes
/// answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<RawResponse>>>,
    calls: Mutex<Vec<(String, Params)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for `path`, optionally only for a given `page`.
    pub fn respond(&self, path: &str, page: Option<u32>, response: RawResponse) -> &Self {
        self.routes
            .lock()
            .entry(route(path, page))
            .or_default()
            .push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<(String, Params)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of requests made for a given page of `path`.
    pub fn page_calls(&self, path: &str, page: u32) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|(p, params)| p == path && page_of(params) == Some(page))
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &str, params: &Params, _timeout: Duration) -> Result<RawResponse> {
        self.calls.lock().push((path.to_string(), params.clone()));

        let mut routes = self.routes.lock();
        let queue = routes
            .get_mut(&route(path, page_of(params)))
            .filter(|q| !q.is_empty());

        let response = match queue {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        drop(routes);

        match response {
            Some(response) => Ok(response),
            None => match self.fallback(path) {
                Some(response) => Ok(response),
                None => Ok(status(404, r#"{"message":"Not Found"}"#)),
            },
        }
    }
}

impl ScriptedTransport {
    /// Page-independent route registered with `page: None`.
    fn fallback(&self, path: &str) -> Option<RawResponse> {
        let mut routes = self.routes.lock();
        let queue = routes.get_mut(&route(path, None))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

fn route(path: &str, page: Option<u32>) -> String {
    match page {
        Some(page) => format!("{}#page={}", path, page),
        None => path.to_string(),
    }
}

fn page_of(params: &Params) -> Option<u32> {
    params
        .get("page")
        .and_then(Value::as_u64)
        .map(|page| page as u32)
}

/// 200 response without pagination headers.
pub fn ok(body: Value) -> RawResponse {
    RawResponse {
        status: 200,
        body: body.to_string(),
        meta: ResponseMeta {
            rate_limit_remaining: Some(4999),
            ..Default::default()
        },
    }
}

/// 200 response whose `Link` header advertises a next page.
pub fn ok_with_next(body: Value, next_page: u32) -> RawResponse {
    let mut response = ok(body);
    response.meta.link = Some(format!(
        "<https://api.github.com/next?page={}>; rel=\"next\"",
        next_page
    ));
    response
}

/// Non-success response with the given body.
pub fn status(code: u16, body: &str) -> RawResponse {
    RawResponse {
        status: code,
        body: body.to_string(),
        meta: ResponseMeta {
            rate_limit_remaining: Some(0),
            rate_limit_reset: Some(1_700_000_000),
            link: None,
        },
    }
}

/// 403 secondary rate limit response.
pub fn rate_limited() -> RawResponse {
    status(
        403,
        r#"{"message":"You have exceeded a secondary rate limit. Please wait a few minutes before you try again."}"#,
    )
}
