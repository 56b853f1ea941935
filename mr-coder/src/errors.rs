//! Crate-wide error hierarchy for mr-coder.
//!
//! - `Error` carries every failure that aborts a run.
//! - `ApplyFailure` is the per-block outcome of the patch engine; it is
//!   collected and retried, never raised directly.
//! - Bad glob patterns and failed commit summaries are logged and absorbed
//!   where they happen, so they have no variant here.

use thiserror::Error;

use ai_llm_service::AiLlmError;
use git_context_engine::GitContextEngineError;
use services::WorkspaceError;

use crate::patch::FailureRecord;

/// Convenient alias for crate-wide results.
pub type CoderResult<T> = Result<T, Error>;

/// Root error type for the mr-coder crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Text generator call failed (provider, transport or config).
    #[error("generation failed: {0}")]
    Generation(#[from] AiLlmError),

    /// The generator answered without a single well-formed edit block.
    #[error("No valid search/replace blocks found in AI response")]
    NoEditsProduced,

    /// Some blocks still fail after the last allowed round.
    #[error("Failed to apply {} blocks after {rounds} rounds", .unresolved.len())]
    RetryBudgetExhausted {
        unresolved: Vec<FailureRecord>,
        rounds: usize,
    },

    /// Source host (GitHub) failure.
    #[error("source host error: {0}")]
    Host(#[from] GitContextEngineError),

    /// Version-control failure in the working copy.
    #[error("version control error: {0}")]
    Vcs(#[from] WorkspaceError),

    /// Local filesystem failure outside per-block application.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad or missing configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Why a single edit block could not be applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplyFailure {
    #[error("File {0} does not exist but has non-empty search content")]
    FileNotFound(String),

    #[error("Search text not found in {0}")]
    SearchTextNotFound(String),

    /// Absolute paths and `..` segments would escape the working root.
    #[error("Path {0} is outside the working tree")]
    InvalidPath(String),

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },
}
