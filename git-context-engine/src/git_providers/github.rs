//! GitHub provider (REST v3) for issues, pull requests and comments.
//!
//! Endpoints used:
//!   * GET  /repos/{owner}/{repo}
//!   * GET  /repos/{owner}/{repo}/issues/{number}
//!   * GET  /repos/{owner}/{repo}/issues/{number}/comments
//!   * GET  /repos/{owner}/{repo}/issues/comments/{id}
//!   * POST /repos/{owner}/{repo}/issues/{number}/comments
//!   * GET  /repos/{owner}/{repo}/pulls/{number}            (json and `vnd.github.diff`)
//!   * GET  /repos/{owner}/{repo}/pulls/{number}/files
//!   * GET  /repos/{owner}/{repo}/pulls/comments/{id}
//!   * POST /repos/{owner}/{repo}/pulls/{number}/comments/{id}/replies
//!   * POST /repos/{owner}/{repo}/pulls
//!   * GET  /repos/{owner}/{repo}/git/ref/heads/{branch}

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use crate::errors::{GitContextEngineError, GitContextEngineResult};
use crate::git_providers::types::*;

const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_DIFF: &str = "application/vnd.github.diff";
const FILES_PER_PAGE: usize = 100;

/// GitHub HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_api: String, // "https://api.github.com"
    auth: String,     // "Bearer <token>"
}

impl GitHubClient {
    /// Constructs a GitHub client with a shared HTTP instance and a raw token.
    pub fn new(http: Client, base_api: String, token: &str) -> Self {
        debug!("Creating GitHubClient with base_api={}", base_api);
        Self {
            http,
            base_api: base_api.trim_end_matches('/').to_string(),
            auth: format!("Bearer {token}"),
        }
    }

    fn repo_url(&self, project: &str, tail: &str) -> GitContextEngineResult<String> {
        let (owner, repo) = split_owner_repo(project)?;
        Ok(format!("{}/repos/{}/{}{}", self.base_api, owner, repo, tail))
    }

    fn get(&self, url: &str, accept: &str) -> RequestBuilder {
        self.http
            .get(url)
            .header("Authorization", &self.auth)
            .header("Accept", accept)
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> RequestBuilder {
        self.http
            .post(url)
            .header("Authorization", &self.auth)
            .header("Accept", ACCEPT_JSON)
            .header("X-GitHub-Api-Version", "2022-11-28")
            .json(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> GitContextEngineResult<T> {
        Ok(self
            .get(url, ACCEPT_JSON)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    /// Fetches issue metadata; `is_pull_request` is derived from the `pull_request` key.
    #[instrument(skip(self), fields(project = %id.project, iid = id.iid))]
    pub async fn get_issue(&self, id: &ChangeRequestId) -> GitContextEngineResult<IssueInfo> {
        let url = self.repo_url(&id.project, &format!("/issues/{}", id.iid))?;
        debug!("GitHub get_issue: {}", url);
        let raw: GitHubIssue = self.get_json(&url).await?;
        Ok(IssueInfo {
            number: raw.number,
            title: raw.title,
            body: raw.body,
            is_pull_request: raw.pull_request.is_some(),
        })
    }

    /// Fetches pull-request metadata including head ref and head clone URL.
    #[instrument(skip(self), fields(project = %id.project, iid = id.iid))]
    pub async fn get_pull_request(
        &self,
        id: &ChangeRequestId,
    ) -> GitContextEngineResult<PullRequestInfo> {
        let url = self.repo_url(&id.project, &format!("/pulls/{}", id.iid))?;
        debug!("GitHub get_pull_request: {}", url);
        let raw: GitHubPr = self.get_json(&url).await?;
        raw.try_into()
    }

    /// Returns the unified diff of a pull request.
    pub async fn get_pull_request_diff(
        &self,
        id: &ChangeRequestId,
    ) -> GitContextEngineResult<String> {
        let url = self.repo_url(&id.project, &format!("/pulls/{}", id.iid))?;
        debug!("GitHub get_pull_request_diff: {}", url);
        Ok(self
            .get(&url, ACCEPT_DIFF)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?)
    }

    /// Lists every file of a pull request, following pagination.
    pub async fn list_pull_request_files(
        &self,
        id: &ChangeRequestId,
    ) -> GitContextEngineResult<Vec<ChangedFile>> {
        let mut out = Vec::new();
        for page in 1.. {
            let url = self.repo_url(
                &id.project,
                &format!("/pulls/{}/files?per_page={FILES_PER_PAGE}&page={page}", id.iid),
            )?;
            debug!("GitHub list_pull_request_files: {}", url);
            let batch: Vec<GitHubPrFile> = self.get_json(&url).await?;
            let len = batch.len();
            out.extend(batch.into_iter().map(|f| ChangedFile {
                filename: f.filename,
                status: f.status,
            }));
            if len < FILES_PER_PAGE {
                break;
            }
        }
        Ok(out)
    }

    /// Lists the conversation comments of an issue or PR (first 100).
    pub async fn list_issue_comments(
        &self,
        id: &ChangeRequestId,
    ) -> GitContextEngineResult<Vec<IssueComment>> {
        let url = self.repo_url(&id.project, &format!("/issues/{}/comments?per_page=100", id.iid))?;
        debug!("GitHub list_issue_comments: {}", url);
        let raw: Vec<GitHubComment> = self.get_json(&url).await?;
        Ok(raw.into_iter().map(IssueComment::from).collect())
    }

    pub async fn get_issue_comment(
        &self,
        project: &str,
        comment_id: u64,
    ) -> GitContextEngineResult<IssueComment> {
        let url = self.repo_url(project, &format!("/issues/comments/{comment_id}"))?;
        debug!("GitHub get_issue_comment: {}", url);
        let raw: GitHubComment = self.get_json(&url).await?;
        Ok(raw.into())
    }

    pub async fn get_review_comment(
        &self,
        project: &str,
        comment_id: u64,
    ) -> GitContextEngineResult<ReviewComment> {
        let url = self.repo_url(project, &format!("/pulls/comments/{comment_id}"))?;
        debug!("GitHub get_review_comment: {}", url);
        let raw: GitHubReviewComment = self.get_json(&url).await?;
        Ok(ReviewComment {
            id: raw.id,
            body: raw.body,
            path: raw.path,
            line: raw.line,
            diff_hunk: raw.diff_hunk,
            position: raw.position,
            commit_id: raw.commit_id,
        })
    }

    pub async fn get_repository(&self, project: &str) -> GitContextEngineResult<RepositoryInfo> {
        let url = self.repo_url(project, "")?;
        debug!("GitHub get_repository: {}", url);
        let raw: GitHubRepo = self.get_json(&url).await?;
        Ok(RepositoryInfo {
            clone_url: raw.clone_url,
            default_branch: raw.default_branch,
        })
    }

    /// `Ok(false)` when the ref does not exist (404); other failures propagate.
    pub async fn branch_exists(&self, project: &str, branch: &str) -> GitContextEngineResult<bool> {
        let url = self.repo_url(project, &format!("/git/ref/heads/{branch}"))?;
        debug!("GitHub branch_exists: {}", url);
        let resp = self.get(&url, ACCEPT_JSON).send().await?;
        if resp.status().as_u16() == 404 {
            return Ok(false);
        }
        resp.error_for_status()?;
        Ok(true)
    }

    pub async fn create_issue_comment(
        &self,
        id: &ChangeRequestId,
        body: &str,
    ) -> GitContextEngineResult<()> {
        let url = self.repo_url(&id.project, &format!("/issues/{}/comments", id.iid))?;
        debug!(len = body.len(), "GitHub create_issue_comment: {}", url);
        self.post(&url, &CommentCreate { body })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Posts a reply into the thread of a review comment.
    pub async fn reply_to_review_comment(
        &self,
        id: &ChangeRequestId,
        comment_id: u64,
        body: &str,
    ) -> GitContextEngineResult<()> {
        let url = self.repo_url(
            &id.project,
            &format!("/pulls/{}/comments/{comment_id}/replies", id.iid),
        )?;
        debug!(len = body.len(), "GitHub reply_to_review_comment: {}", url);
        self.post(&url, &CommentCreate { body })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn create_pull_request(
        &self,
        project: &str,
        pr: &NewPullRequest,
    ) -> GitContextEngineResult<PullRequestInfo> {
        let url = self.repo_url(project, "/pulls")?;
        debug!(head = %pr.head, base = %pr.base, "GitHub create_pull_request: {}", url);
        let raw: GitHubPr = self
            .post(&url, pr)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        raw.try_into()
    }
}

/// Splits "owner/repo" into components or returns a validation error.
pub fn split_owner_repo(project: &str) -> GitContextEngineResult<(String, String)> {
    let mut parts = project.split('/');
    let owner = parts.next().unwrap_or("").trim();
    let repo = parts.next().unwrap_or("").trim();

    if owner.is_empty() || repo.is_empty() || parts.next().is_some() {
        return Err(GitContextEngineError::Validation(format!(
            "invalid GitHub project id '{}', expected 'owner/repo'",
            project
        )));
    }

    Ok((owner.to_string(), repo.to_string()))
}

/// GitHub issue response (subset).
#[derive(Debug, Deserialize)]
struct GitHubIssue {
    number: u64,
    title: String,
    body: Option<String>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

/// GitHub PR response (subset).
#[derive(Debug, Deserialize)]
struct GitHubPr {
    number: u64,
    title: String,
    body: Option<String>,
    html_url: String,
    base: GitHubRef,
    head: GitHubRef,
}

impl TryFrom<GitHubPr> for PullRequestInfo {
    type Error = GitContextEngineError;

    fn try_from(pr: GitHubPr) -> Result<Self, Self::Error> {
        // `head.repo` is null when the fork was deleted.
        let head_clone_url = pr.head.repo.map(|r| r.clone_url).ok_or_else(|| {
            GitContextEngineError::Provider(
                crate::errors::GitContextEngineProviderError::InvalidResponse(format!(
                    "pull request #{} has no head repository",
                    pr.number
                )),
            )
        })?;
        Ok(PullRequestInfo {
            number: pr.number,
            title: pr.title,
            body: pr.body,
            head_ref: pr.head.r#ref,
            head_clone_url,
            base_ref: pr.base.r#ref,
            html_url: pr.html_url,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GitHubRef {
    #[serde(rename = "ref")]
    r#ref: String,
    #[serde(default)]
    repo: Option<GitHubRepo>,
}

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    clone_url: String,
    #[serde(default)]
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct GitHubPrFile {
    filename: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GitHubComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
    user: Option<GitHubUser>,
}

impl From<GitHubComment> for IssueComment {
    fn from(c: GitHubComment) -> Self {
        IssueComment {
            id: c.id,
            author: c.user.map(|u| u.login).unwrap_or_default(),
            body: c.body.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitHubReviewComment {
    id: u64,
    body: String,
    path: String,
    #[serde(default)]
    line: Option<u32>,
    diff_hunk: String,
    #[serde(default)]
    position: Option<u32>,
    commit_id: String,
}

#[derive(Debug, Serialize)]
struct CommentCreate<'a> {
    body: &'a str,
}
