//! Commit history extraction.
//!
//! The pipeline only sees the [`HistorySource`] trait; [`git::GitHistory`]
//! is the production implementation.

pub mod git;

use async_trait::async_trait;
use thiserror::Error;

pub use git::GitHistory;

/// Errors from the history reader.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error(
        "invalid reference '{0}'. Make sure it's a valid git commit, tag, or branch \
         (e.g. 'HEAD', 'main', 'v1.0.0', or 'abc1234')"
    )]
    InvalidRef(String),

    #[error("git is not installed or not found in PATH: {0}")]
    ToolUnavailable(String),

    #[error("git command failed: {0}")]
    Git(String),
}

/// Read-only view of a repository's history.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// One `"<short hash> <subject>"` line per commit in `from..to`, newest first.
    async fn log_range(&self, from: &str, to: &str) -> Result<Vec<String>, HistoryError>;

    /// Commit ids reachable from `to` but not from `from`, oldest first.
    async fn commit_range(&self, from: &str, to: &str) -> Result<Vec<String>, HistoryError>;

    /// Full message and diff of one commit.
    async fn commit_details(&self, id: &str) -> Result<String, HistoryError>;
}
