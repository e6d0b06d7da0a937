// GitHub API module.
// Transport, cached fetcher, retry policy, and paginator for the REST API.

pub mod client;
pub mod fetch;
pub mod paginate;
pub mod params;
pub mod retry;
#[cfg(test)]
pub mod testing;
pub mod types;

pub use client::{GitHubTransport, Transport};
pub use fetch::{CachedResponse, Fetcher, ResponseCache};
pub use paginate::{Paginator, extract_items};
pub use params::Params;
pub use retry::RetryPolicy;
pub use types::*;
