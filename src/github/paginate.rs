// Page-following aggregator.
// Walks `page=1..` through the fetcher until results run out or the page budget is spent.

use std::sync::Arc;

use serde_json::Value;
use tokio::time::sleep;
use tracing::debug;

use crate::error::Result;

use super::fetch::Fetcher;
use super::retry::RetryPolicy;
use super::types::{FetchResult, PageRequest, PageResult};

/// Aggregates list endpoints across pages.
pub struct Paginator {
    fetcher: Arc<Fetcher>,
    retry: RetryPolicy,
}

impl Paginator {
    /// Create a paginator with the default rate-limit retry policy.
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self {
            fetcher,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy applied to each page.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The fetcher each page goes through.
    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Fetch every page of `request.path`, up to `request.max_pages`.
    ///
    /// Stops quietly on an empty page, on a response with no next link, or
    /// when the page budget runs out. A remote failure (after the retry
    /// policy is exhausted) discards anything collected so far and is
    /// returned on its own; pages already fetched stay cached.
    pub async fn fetch_all(&self, request: &PageRequest) -> Result<PageResult> {
        let mut items = Vec::new();
        let mut page = 1;
        let mut pages = 0;

        while page <= request.max_pages {
            let params = request.params.with_page(page);
            let label = format!("{} page {}", request.path, page);

            let result = self
                .retry
                .run(&label, || self.fetcher.fetch(&request.path, &params, true))
                .await?;

            let success = match result {
                FetchResult::Success(success) => success,
                FetchResult::Failure(failure) => return Ok(PageResult::Failure(failure)),
            };
            pages += 1;

            let has_next = success.has_next_page();
            let page_items = extract_items(success.payload);
            debug!(
                path = %request.path,
                page,
                count = page_items.len(),
                cached = success.served_from_cache,
                "fetched page"
            );

            // An empty page ends the listing even if a next link is present.
            if page_items.is_empty() {
                break;
            }
            items.extend(page_items);

            if !has_next {
                break;
            }

            page += 1;
            if !request.inter_page_delay.is_zero() && page <= request.max_pages {
                sleep(request.inter_page_delay).await;
            }
        }

        Ok(PageResult::Success { items, pages })
    }
}

/// Pull the result list out of a page: either a bare array or `{"items": [...]}`.
pub fn extract_items(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut object) => match object.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
