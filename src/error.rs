// Error types for repo-oracle.
// Transport, parsing, session, and surfaced remote failures.

use thiserror::Error;

use crate::github::FetchFailure;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("GitHub transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error {}: {}", .0.status, .0.message)]
    Remote(FetchFailure),

    #[error("No repo set. Call connect_repo(owner, repo) first or pass owner/repo.")]
    NoRepo,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<FetchFailure> for OracleError {
    fn from(failure: FetchFailure) -> Self {
        OracleError::Remote(failure)
    }
}

pub type Result<T> = std::result::Result<T, OracleError>;
