// repo-oracle library.
// Cached, rate-limit aware GitHub gateway exposing a small set of agent tools.

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod github;
pub mod tools;

pub use config::Config;
pub use context::{OracleContext, RepoRef};
pub use error::{OracleError, Result};
