//! Scripted fakes for the three capability traits.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use ai_llm_service::AiLlmError;
use git_context_engine::GitContextEngineError;
use git_context_engine::errors::GitContextEngineProviderError;
use git_context_engine::git_providers::{
    ChangeRequestId, ChangedFile, IssueComment, IssueInfo, NewPullRequest, PullRequestInfo,
    RepositoryInfo, ReviewComment,
};
use services::WorkspaceError;

use crate::errors::{CoderResult, Error};
use crate::generator::{GenerationRequest, TextGenerator};
use crate::host::SourceHost;
use crate::vcs::VersionControl;

/* ------------------------------------------------------------------------- */
/* Generator                                                                 */
/* ------------------------------------------------------------------------- */

/// Answers from a queue; an exhausted queue (or `failing()`) is a generation error.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> CoderResult<String> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Generation(AiLlmError::Timeout(Duration::from_secs(30))))
    }
}

/* ------------------------------------------------------------------------- */
/* Source host                                                               */
/* ------------------------------------------------------------------------- */

fn not_found() -> Error {
    Error::Host(GitContextEngineError::Provider(
        GitContextEngineProviderError::NotFound,
    ))
}

#[derive(Debug, Default)]
pub struct HostState {
    pub issues: HashMap<u64, IssueInfo>,
    pub pulls: HashMap<u64, PullRequestInfo>,
    pub files: HashMap<u64, Vec<ChangedFile>>,
    pub diffs: HashMap<u64, String>,
    pub threads: HashMap<u64, Vec<IssueComment>>,
    pub issue_comments: HashMap<u64, IssueComment>,
    pub review_comments: HashMap<u64, ReviewComment>,
    pub repo: Option<RepositoryInfo>,
    pub branches: HashSet<String>,
    /// `(issue number, body)` of every posted issue comment.
    pub posted: Vec<(u64, String)>,
    /// `(pr number, review comment id, body)` of every review reply.
    pub review_replies: Vec<(u64, u64, String)>,
    pub created_prs: Vec<NewPullRequest>,
}

/// In-memory host. Missing entries answer 404.
#[derive(Debug, Default)]
pub struct FakeHost {
    pub state: Mutex<HostState>,
}

impl FakeHost {
    pub fn with_issue(self, number: u64, title: &str, body: &str) -> Self {
        self.state.lock().unwrap().issues.insert(
            number,
            IssueInfo {
                number,
                title: title.into(),
                body: Some(body.into()),
                is_pull_request: false,
            },
        );
        self
    }

    /// Registers PR `number` (and its backing issue) with head branch `head_ref`.
    pub fn with_pull(self, number: u64, head_ref: &str, files: &[&str]) -> Self {
        {
            let mut s = self.state.lock().unwrap();
            s.issues.insert(
                number,
                IssueInfo {
                    number,
                    title: "Greeting PR".into(),
                    body: Some("Changes the greeting".into()),
                    is_pull_request: true,
                },
            );
            s.pulls.insert(
                number,
                PullRequestInfo {
                    number,
                    title: "Greeting PR".into(),
                    body: Some("Changes the greeting".into()),
                    head_ref: head_ref.into(),
                    head_clone_url: "https://github.com/octo/repo.git".into(),
                    base_ref: "main".into(),
                    html_url: format!("https://github.com/octo/repo/pull/{number}"),
                },
            );
            s.files.insert(
                number,
                files
                    .iter()
                    .map(|f| ChangedFile {
                        filename: f.to_string(),
                        status: "modified".into(),
                    })
                    .collect(),
            );
            s.diffs
                .insert(number, "--- a/hello.txt\n+++ b/hello.txt\n".into());
        }
        self
    }

    pub fn with_repo(self, default_branch: &str) -> Self {
        self.state.lock().unwrap().repo = Some(RepositoryInfo {
            clone_url: "https://github.com/octo/repo.git".into(),
            default_branch: default_branch.into(),
        });
        self
    }

    pub fn with_branch(self, name: &str) -> Self {
        self.state.lock().unwrap().branches.insert(name.into());
        self
    }

    pub fn with_issue_comment(self, issue: u64, id: u64, body: &str) -> Self {
        {
            let mut s = self.state.lock().unwrap();
            let comment = IssueComment {
                id,
                author: "octocat".into(),
                body: body.into(),
            };
            s.threads.entry(issue).or_default().push(comment.clone());
            s.issue_comments.insert(id, comment);
        }
        self
    }

    pub fn with_review_comment(self, id: u64, body: &str) -> Self {
        self.state.lock().unwrap().review_comments.insert(
            id,
            ReviewComment {
                id,
                body: body.into(),
                path: "hello.txt".into(),
                line: Some(1),
                diff_hunk: "@@ -1 +1 @@\n-hello\n+hello world".into(),
                position: Some(1),
                commit_id: "abc123".into(),
            },
        );
        self
    }

    pub fn posted(&self) -> Vec<(u64, String)> {
        self.state.lock().unwrap().posted.clone()
    }

    pub fn review_replies(&self) -> Vec<(u64, u64, String)> {
        self.state.lock().unwrap().review_replies.clone()
    }

    pub fn created_prs(&self) -> Vec<NewPullRequest> {
        self.state.lock().unwrap().created_prs.clone()
    }
}

impl SourceHost for FakeHost {
    async fn get_issue(&self, id: &ChangeRequestId) -> CoderResult<IssueInfo> {
        let s = self.state.lock().unwrap();
        s.issues.get(&id.iid).cloned().ok_or_else(not_found)
    }

    async fn get_pull_request(&self, id: &ChangeRequestId) -> CoderResult<PullRequestInfo> {
        let s = self.state.lock().unwrap();
        s.pulls.get(&id.iid).cloned().ok_or_else(not_found)
    }

    async fn list_pull_request_files(&self, id: &ChangeRequestId) -> CoderResult<Vec<ChangedFile>> {
        let s = self.state.lock().unwrap();
        Ok(s.files.get(&id.iid).cloned().unwrap_or_default())
    }

    async fn get_pull_request_diff(&self, id: &ChangeRequestId) -> CoderResult<String> {
        let s = self.state.lock().unwrap();
        s.diffs.get(&id.iid).cloned().ok_or_else(not_found)
    }

    async fn list_issue_comments(&self, id: &ChangeRequestId) -> CoderResult<Vec<IssueComment>> {
        let s = self.state.lock().unwrap();
        Ok(s.threads.get(&id.iid).cloned().unwrap_or_default())
    }

    async fn get_issue_comment(
        &self,
        _project: &str,
        comment_id: u64,
    ) -> CoderResult<IssueComment> {
        let s = self.state.lock().unwrap();
        s.issue_comments.get(&comment_id).cloned().ok_or_else(not_found)
    }

    async fn get_review_comment(
        &self,
        _project: &str,
        comment_id: u64,
    ) -> CoderResult<ReviewComment> {
        let s = self.state.lock().unwrap();
        s.review_comments.get(&comment_id).cloned().ok_or_else(not_found)
    }

    async fn get_repository(&self, _project: &str) -> CoderResult<RepositoryInfo> {
        let s = self.state.lock().unwrap();
        s.repo.clone().ok_or_else(not_found)
    }

    async fn branch_exists(&self, _project: &str, branch: &str) -> CoderResult<bool> {
        Ok(self.state.lock().unwrap().branches.contains(branch))
    }

    async fn create_issue_comment(&self, id: &ChangeRequestId, body: &str) -> CoderResult<()> {
        self.state
            .lock()
            .unwrap()
            .posted
            .push((id.iid, body.to_string()));
        Ok(())
    }

    async fn reply_to_review_comment(
        &self,
        id: &ChangeRequestId,
        comment_id: u64,
        body: &str,
    ) -> CoderResult<()> {
        self.state
            .lock()
            .unwrap()
            .review_replies
            .push((id.iid, comment_id, body.to_string()));
        Ok(())
    }

    async fn create_pull_request(
        &self,
        _project: &str,
        pr: &NewPullRequest,
    ) -> CoderResult<PullRequestInfo> {
        let mut s = self.state.lock().unwrap();
        s.created_prs.push(pr.clone());
        let number = 100 + s.created_prs.len() as u64;
        Ok(PullRequestInfo {
            number,
            title: pr.title.clone(),
            body: Some(pr.body.clone()),
            head_ref: pr.head.clone(),
            head_clone_url: "https://github.com/octo/repo.git".into(),
            base_ref: pr.base.clone(),
            html_url: format!("https://github.com/octo/repo/pull/{number}"),
        })
    }
}

/* ------------------------------------------------------------------------- */
/* Version control                                                           */
/* ------------------------------------------------------------------------- */

/// Records calls and writes `seed` into the destination on clone.
#[derive(Debug, Default)]
pub struct FakeVcs {
    seed: Vec<(String, String)>,
    /// Reverted commit message; `None` makes `revert_head` fail.
    revert_message: Option<String>,
    /// Error text returned by `push`; `None` means push succeeds.
    push_error: Option<String>,
    calls: Mutex<Vec<String>>,
    roots: Mutex<Vec<PathBuf>>,
    committed: Mutex<Vec<BTreeMap<String, String>>>,
}

impl FakeVcs {
    pub fn seeded(files: &[(&str, &str)]) -> Self {
        Self {
            seed: files
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_revert(mut self, message: &str) -> Self {
        self.revert_message = Some(message.into());
        self
    }

    pub fn with_push_error(mut self, error: &str) -> Self {
        self.push_error = Some(error.into());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Every clone destination seen so far.
    pub fn roots(&self) -> Vec<PathBuf> {
        self.roots.lock().unwrap().clone()
    }

    /// Tree snapshot taken at each commit.
    pub fn committed(&self) -> Vec<BTreeMap<String, String>> {
        self.committed.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn snapshot(root: &Path, dir: &Path, out: &mut BTreeMap<String, String>) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            snapshot(root, &path, out);
        } else if let (Ok(rel), Ok(content)) =
            (path.strip_prefix(root), fs::read_to_string(&path))
        {
            out.insert(rel.to_string_lossy().replace('\\', "/"), content);
        }
    }
}

impl VersionControl for FakeVcs {
    async fn clone_branch(
        &self,
        url: &str,
        branch: &str,
        dest: &Path,
        depth: u32,
    ) -> CoderResult<()> {
        self.record(format!("clone {url} {branch} depth={depth}"));
        self.roots.lock().unwrap().push(dest.to_path_buf());
        fs::create_dir_all(dest)?;
        for (path, content) in &self.seed {
            let target = dest.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(target, content)?;
        }
        Ok(())
    }

    async fn checkout_new_branch(&self, _root: &Path, name: &str) -> CoderResult<()> {
        self.record(format!("checkout_new_branch {name}"));
        Ok(())
    }

    async fn stage_all(&self, _root: &Path) -> CoderResult<()> {
        self.record("stage_all".into());
        Ok(())
    }

    async fn commit(&self, root: &Path, message: &str) -> CoderResult<String> {
        self.record(format!("commit {message}"));
        let mut tree = BTreeMap::new();
        snapshot(root, root, &mut tree);
        self.committed.lock().unwrap().push(tree);
        Ok("0123456789abcdef".into())
    }

    async fn push(&self, _root: &Path, url: &str, branch: &str) -> CoderResult<()> {
        self.record(format!("push {url} {branch}"));
        match &self.push_error {
            Some(e) => Err(Error::Vcs(WorkspaceError::PushRejected(e.clone()))),
            None => Ok(()),
        }
    }

    async fn revert_head(&self, _root: &Path) -> CoderResult<String> {
        self.record("revert_head".into());
        self.revert_message
            .clone()
            .ok_or(Error::Vcs(WorkspaceError::NothingToRevert))
    }
}
