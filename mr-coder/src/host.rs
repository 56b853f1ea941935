//! Source-host capability (issues, pull requests, comments) used by the core
//! and the bot commands. `GitHubClient` is the production implementation.

use std::future::Future;

use git_context_engine::GitHubClient;
use git_context_engine::git_providers::{
    ChangeRequestId, ChangedFile, IssueComment, IssueInfo, NewPullRequest, PullRequestInfo,
    RepositoryInfo, ReviewComment,
};

use crate::errors::CoderResult;

pub trait SourceHost: Send + Sync {
    fn get_issue(&self, id: &ChangeRequestId)
    -> impl Future<Output = CoderResult<IssueInfo>> + Send;

    fn get_pull_request(
        &self,
        id: &ChangeRequestId,
    ) -> impl Future<Output = CoderResult<PullRequestInfo>> + Send;

    fn list_pull_request_files(
        &self,
        id: &ChangeRequestId,
    ) -> impl Future<Output = CoderResult<Vec<ChangedFile>>> + Send;

    fn get_pull_request_diff(
        &self,
        id: &ChangeRequestId,
    ) -> impl Future<Output = CoderResult<String>> + Send;

    fn list_issue_comments(
        &self,
        id: &ChangeRequestId,
    ) -> impl Future<Output = CoderResult<Vec<IssueComment>>> + Send;

    fn get_issue_comment(
        &self,
        project: &str,
        comment_id: u64,
    ) -> impl Future<Output = CoderResult<IssueComment>> + Send;

    fn get_review_comment(
        &self,
        project: &str,
        comment_id: u64,
    ) -> impl Future<Output = CoderResult<ReviewComment>> + Send;

    fn get_repository(
        &self,
        project: &str,
    ) -> impl Future<Output = CoderResult<RepositoryInfo>> + Send;

    fn branch_exists(
        &self,
        project: &str,
        branch: &str,
    ) -> impl Future<Output = CoderResult<bool>> + Send;

    fn create_issue_comment(
        &self,
        id: &ChangeRequestId,
        body: &str,
    ) -> impl Future<Output = CoderResult<()>> + Send;

    fn reply_to_review_comment(
        &self,
        id: &ChangeRequestId,
        comment_id: u64,
        body: &str,
    ) -> impl Future<Output = CoderResult<()>> + Send;

    fn create_pull_request(
        &self,
        project: &str,
        pr: &NewPullRequest,
    ) -> impl Future<Output = CoderResult<PullRequestInfo>> + Send;
}

impl SourceHost for GitHubClient {
    async fn get_issue(&self, id: &ChangeRequestId) -> CoderResult<IssueInfo> {
        Ok(GitHubClient::get_issue(self, id).await?)
    }

    async fn get_pull_request(&self, id: &ChangeRequestId) -> CoderResult<PullRequestInfo> {
        Ok(GitHubClient::get_pull_request(self, id).await?)
    }

    async fn list_pull_request_files(&self, id: &ChangeRequestId) -> CoderResult<Vec<ChangedFile>> {
        Ok(GitHubClient::list_pull_request_files(self, id).await?)
    }

    async fn get_pull_request_diff(&self, id: &ChangeRequestId) -> CoderResult<String> {
        Ok(GitHubClient::get_pull_request_diff(self, id).await?)
    }

    async fn list_issue_comments(&self, id: &ChangeRequestId) -> CoderResult<Vec<IssueComment>> {
        Ok(GitHubClient::list_issue_comments(self, id).await?)
    }

    async fn get_issue_comment(&self, project: &str, comment_id: u64) -> CoderResult<IssueComment> {
        Ok(GitHubClient::get_issue_comment(self, project, comment_id).await?)
    }

    async fn get_review_comment(
        &self,
        project: &str,
        comment_id: u64,
    ) -> CoderResult<ReviewComment> {
        Ok(GitHubClient::get_review_comment(self, project, comment_id).await?)
    }

    async fn get_repository(&self, project: &str) -> CoderResult<RepositoryInfo> {
        Ok(GitHubClient::get_repository(self, project).await?)
    }

    async fn branch_exists(&self, project: &str, branch: &str) -> CoderResult<bool> {
        Ok(GitHubClient::branch_exists(self, project, branch).await?)
    }

    async fn create_issue_comment(&self, id: &ChangeRequestId, body: &str) -> CoderResult<()> {
        Ok(GitHubClient::create_issue_comment(self, id, body).await?)
    }

    async fn reply_to_review_comment(
        &self,
        id: &ChangeRequestId,
        comment_id: u64,
        body: &str,
    ) -> CoderResult<()> {
        Ok(GitHubClient::reply_to_review_comment(self, id, comment_id, body).await?)
    }

    async fn create_pull_request(
        &self,
        project: &str,
        pr: &NewPullRequest,
    ) -> CoderResult<PullRequestInfo> {
        Ok(GitHubClient::create_pull_request(self, project, pr).await?)
    }
}
