// Cache module for in-memory response caching.
// Holds the LRU store and the request keying used by the fetcher.

pub mod key;
pub mod store;

pub use key::request_key;
pub use store::{CacheStore, DEFAULT_CAPACITY};
