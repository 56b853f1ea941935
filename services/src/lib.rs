//! Shared infrastructure: the git working copy used by the coder and
//! helpers that keep tokens out of logs and replies.

pub mod errors;
pub mod git;
pub mod redact;

pub use errors::{Result, WorkspaceError};
pub use git::{CommitIdentity, GitWorkspace};
