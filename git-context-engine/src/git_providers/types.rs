//! Normalized data model for issues, pull requests and their comments.

use serde::{Deserialize, Serialize};

/// A unique reference to an issue or pull request.
///
/// * `project` – "owner/repo".
/// * `iid`     – issue or PR number (GitHub shares one sequence for both).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequestId {
    pub project: String,
    pub iid: u64,
}

impl ChangeRequestId {
    pub fn new(project: impl Into<String>, iid: u64) -> Self {
        Self {
            project: project.into(),
            iid,
        }
    }
}

/// Issue metadata. `is_pull_request` is set when the issue backs a PR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueInfo {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub is_pull_request: bool,
}

/// Pull-request metadata needed to check out and push to its head branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestInfo {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub head_ref: String,
    /// Clone URL of the head repository (may be a fork).
    pub head_clone_url: String,
    pub base_ref: String,
    pub html_url: String,
}

/// One file touched by a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    /// `added` | `modified` | `removed` | `renamed` | ...
    pub status: String,
}

impl ChangedFile {
    pub fn is_removed(&self) -> bool {
        self.status == "removed"
    }
}

/// Conversation comment on an issue or PR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    pub author: String,
    pub body: String,
}

/// Review comment anchored to a line of a PR diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewComment {
    pub id: u64,
    pub body: String,
    pub path: String,
    pub line: Option<u32>,
    pub diff_hunk: String,
    pub position: Option<u32>,
    pub commit_id: String,
}

/// Repository facts needed to pick a base branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub clone_url: String,
    pub default_branch: String,
}

/// Payload for opening a pull request.
#[derive(Debug, Clone, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}
