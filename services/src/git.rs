//! Blocking git operations on a local working copy, built on `git2` (libgit2).
//!
//! - Every call takes the working root explicitly; the process cwd is never touched.
//! - HTTPS auth: `x-access-token` + token via credential callbacks, so the
//!   token never appears in a remote URL or on disk.
//! - Callers on a Tokio runtime must run these inside `spawn_blocking`.

use std::path::Path;

use git2::{
    Cred, CredentialType, FetchOptions, IndexAddOption, Oid, PushOptions, RemoteCallbacks,
    Repository, Signature, build::CheckoutBuilder, build::RepoBuilder,
};
use tracing::{debug, info, instrument, warn};

use crate::errors::{Result, WorkspaceError};
use crate::redact::mask_credentials;

pub const DEFAULT_BOT_NAME: &str = "GitHub AI Actions";
pub const DEFAULT_BOT_EMAIL: &str = "github-actions[bot]@users.noreply.github.com";

/// Author/committer identity used for bot commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

impl Default for CommitIdentity {
    fn default() -> Self {
        Self {
            name: DEFAULT_BOT_NAME.to_string(),
            email: DEFAULT_BOT_EMAIL.to_string(),
        }
    }
}

impl CommitIdentity {
    /// Reads `BOT_GIT_NAME` / `BOT_GIT_EMAIL`, falling back to the defaults.
    pub fn from_env() -> Self {
        let def = Self::default();
        Self {
            name: env_non_empty("BOT_GIT_NAME").unwrap_or(def.name),
            email: env_non_empty("BOT_GIT_EMAIL").unwrap_or(def.email),
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Git operations bound to one access token and one commit identity.
#[derive(Clone)]
pub struct GitWorkspace {
    token: Option<String>,
    identity: CommitIdentity,
}

impl std::fmt::Debug for GitWorkspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitWorkspace")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("identity", &self.identity)
            .finish()
    }
}

impl GitWorkspace {
    pub fn new(token: Option<String>, identity: CommitIdentity) -> Self {
        Self { token, identity }
    }

    pub fn identity(&self) -> &CommitIdentity {
        &self.identity
    }

    fn callbacks<'a>(&self) -> RemoteCallbacks<'a> {
        let token = self.token.clone();
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |_url, username_from_url, allowed| {
            if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
                if let Some(ref token) = token {
                    return Cred::userpass_plaintext("x-access-token", token);
                }
            }
            if allowed.contains(CredentialType::DEFAULT) {
                if let Ok(cred) = Cred::default() {
                    return Ok(cred);
                }
            }
            if allowed.contains(CredentialType::USERNAME) {
                return Cred::username(username_from_url.unwrap_or("git"));
            }
            Err(git2::Error::from_str("no usable credentials"))
        });
        callbacks
    }

    /// Clones a single branch of `url` into `dest`.
    ///
    /// `depth > 0` makes the clone shallow. The local transport has no shallow
    /// support, so depth is ignored for `file://` and plain paths.
    #[instrument(skip_all, fields(url = %mask_credentials(url), branch = %branch, depth = depth))]
    pub fn clone_branch(&self, url: &str, branch: &str, dest: &Path, depth: u32) -> Result<()> {
        info!(path = %dest.display(), "clone start");

        let mut fetch_opts = FetchOptions::new();
        fetch_opts.remote_callbacks(self.callbacks());
        if depth > 0 && is_network_url(url) {
            fetch_opts.depth(i32::try_from(depth).unwrap_or(i32::MAX));
        }

        let refspec = format!("+refs/heads/{branch}:refs/remotes/origin/{branch}");
        let mut builder = RepoBuilder::new();
        builder
            .branch(branch)
            .fetch_options(fetch_opts)
            .remote_create(move |repo, name, url| repo.remote_with_fetch(name, url, &refspec));

        builder.clone(url, dest).map_err(|e| {
            warn!(error = %mask_credentials(e.message()), "clone failed");
            WorkspaceError::Git(e)
        })?;

        info!(path = %dest.display(), "clone completed");
        Ok(())
    }

    /// Creates `name` from HEAD, points HEAD at it and checks it out.
    #[instrument(skip_all, fields(branch = %name))]
    pub fn checkout_new_branch(&self, root: &Path, name: &str) -> Result<()> {
        let repo = Repository::open(root)?;
        let head = repo.head()?.peel_to_commit()?;
        repo.branch(name, &head, false)?;
        repo.set_head(&format!("refs/heads/{name}"))?;
        repo.checkout_head(Some(CheckoutBuilder::new().safe()))?;
        debug!(commit = %head.id(), "branch created");
        Ok(())
    }

    /// Stages every change under `root`, including deletions.
    #[instrument(skip_all)]
    pub fn stage_all(&self, root: &Path) -> Result<()> {
        let repo = Repository::open(root)?;
        let mut index = repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        index.write()?;
        Ok(())
    }

    /// Commits the current index on top of HEAD and returns the new commit id.
    #[instrument(skip_all, fields(len = message.len()))]
    pub fn commit(&self, root: &Path, message: &str) -> Result<Oid> {
        let repo = Repository::open(root)?;
        let sig = self.signature()?;
        let mut index = repo.index()?;
        let tree = repo.find_tree(index.write_tree()?)?;
        let parent = repo.head()?.peel_to_commit()?;
        let oid = repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])?;
        info!(commit = %oid, "committed");
        Ok(oid)
    }

    /// Pushes the local `branch` to the same-named branch of `url`.
    #[instrument(skip_all, fields(url = %mask_credentials(url), branch = %branch))]
    pub fn push(&self, root: &Path, url: &str, branch: &str) -> Result<()> {
        let repo = Repository::open(root)?;
        let mut remote = repo.remote_anonymous(url)?;
        let spec = format!("refs/heads/{branch}:refs/heads/{branch}");

        let mut rejected: Option<String> = None;
        {
            let mut callbacks = self.callbacks();
            callbacks.push_update_reference(|refname, status| {
                if let Some(msg) = status {
                    rejected = Some(format!("{refname}: {msg}"));
                }
                Ok(())
            });
            let mut opts = PushOptions::new();
            opts.remote_callbacks(callbacks);
            remote.push(&[spec.as_str()], Some(&mut opts))?;
        }

        if let Some(reason) = rejected {
            warn!(%reason, "push rejected");
            return Err(WorkspaceError::PushRejected(reason));
        }
        info!("push completed");
        Ok(())
    }

    /// Reverts HEAD against its parent and commits the result.
    ///
    /// Returns the (trimmed) message of the reverted commit. Requires the
    /// parent commit to be present, so shallow clones need depth >= 2.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn revert_head(&self, root: &Path) -> Result<String> {
        let repo = Repository::open(root)?;
        let head = repo.head()?.peel_to_commit()?;
        if head.parent_count() == 0 {
            return Err(WorkspaceError::NothingToRevert);
        }

        let reverted_msg = head.message().unwrap_or_default().trim().to_string();
        let subject = head.summary().unwrap_or_default().to_string();

        let mut index = repo.revert_commit(&head, &head, 0, None)?;
        if index.has_conflicts() {
            return Err(WorkspaceError::RevertConflict(head.id().to_string()));
        }
        let tree = repo.find_tree(index.write_tree_to(&repo)?)?;

        let sig = self.signature()?;
        let message = format!("Revert \"{subject}\"\n\nThis reverts commit {}.\n", head.id());
        let oid = repo.commit(Some("HEAD"), &sig, &sig, &message, &tree, &[&head])?;
        repo.checkout_head(Some(CheckoutBuilder::new().force()))?;

        info!(reverted = %head.id(), commit = %oid, "reverted HEAD");
        Ok(reverted_msg)
    }

    fn signature(&self) -> Result<Signature<'static>> {
        Ok(Signature::now(&self.identity.name, &self.identity.email)?)
    }
}

fn is_network_url(url: &str) -> bool {
    url.starts_with("https://")
        || url.starts_with("http://")
        || url.starts_with("ssh://")
        || url.starts_with("git@")
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    fn seed_bare(dir: &Path) -> String {
        let repo = Repository::init_bare(dir).unwrap();
        {
            let sig = Signature::now("seed", "seed@example.com").unwrap();
            let blob = repo.blob(b"hello\n").unwrap();
            let mut tb = repo.treebuilder(None).unwrap();
            tb.insert("README.md", blob, 0o100644).unwrap();
            let tree = repo.find_tree(tb.write().unwrap()).unwrap();
            repo.commit(Some("refs/heads/main"), &sig, &sig, "init", &tree, &[])
                .unwrap();
        }
        repo.set_head("refs/heads/main").unwrap();
        format!("file://{}", dir.display())
    }

    fn workspace() -> GitWorkspace {
        GitWorkspace::new(None, CommitIdentity::default())
    }

    fn setup() -> (TempDir, String, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let url = seed_bare(&tmp.path().join("remote.git"));
        let work = tmp.path().join("work");
        (tmp, url, work)
    }

    fn remote_head_message(tmp: &TempDir, branch: &str) -> String {
        let repo = Repository::open_bare(tmp.path().join("remote.git")).unwrap();
        let commit = repo
            .find_reference(&format!("refs/heads/{branch}"))
            .unwrap()
            .peel_to_commit()
            .unwrap();
        commit.message().unwrap().to_string()
    }

    #[test]
    fn commit_and_push_to_same_branch() {
        let (tmp, url, work) = setup();
        let ws = workspace();
        ws.clone_branch(&url, "main", &work, 1).unwrap();
        assert_eq!(fs::read_to_string(work.join("README.md")).unwrap(), "hello\n");

        fs::write(work.join("README.md"), "changed\n").unwrap();
        fs::create_dir_all(work.join("src")).unwrap();
        fs::write(work.join("src/new.rs"), "fn main() {}\n").unwrap();
        ws.stage_all(&work).unwrap();
        ws.commit(&work, "Update readme\n\nRequested by comment on PR #1")
            .unwrap();
        ws.push(&work, &url, "main").unwrap();

        assert_eq!(
            remote_head_message(&tmp, "main"),
            "Update readme\n\nRequested by comment on PR #1"
        );

        let repo = Repository::open(&work).unwrap();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.author().name(), Some(DEFAULT_BOT_NAME));
        assert!(head.tree().unwrap().get_path(Path::new("src/new.rs")).is_ok());
    }

    #[test]
    fn new_branch_is_pushed() {
        let (tmp, url, work) = setup();
        let ws = workspace();
        ws.clone_branch(&url, "main", &work, 1).unwrap();
        ws.checkout_new_branch(&work, "ai-bot/ai-changes-issue-4").unwrap();

        fs::write(work.join("NOTES.md"), "x\n").unwrap();
        ws.stage_all(&work).unwrap();
        ws.commit(&work, "Add notes").unwrap();
        ws.push(&work, &url, "ai-bot/ai-changes-issue-4").unwrap();

        assert_eq!(remote_head_message(&tmp, "ai-bot/ai-changes-issue-4"), "Add notes");
        assert_eq!(remote_head_message(&tmp, "main"), "init");
    }

    #[test]
    fn stage_all_records_deletions() {
        let (_tmp, url, work) = setup();
        let ws = workspace();
        ws.clone_branch(&url, "main", &work, 0).unwrap();
        fs::remove_file(work.join("README.md")).unwrap();
        ws.stage_all(&work).unwrap();
        ws.commit(&work, "Remove readme").unwrap();

        let repo = Repository::open(&work).unwrap();
        let tree = repo.head().unwrap().peel_to_tree().unwrap();
        assert!(tree.get_path(Path::new("README.md")).is_err());
    }

    #[test]
    fn revert_head_restores_parent_content() {
        let (tmp, url, work) = setup();
        let ws = workspace();
        ws.clone_branch(&url, "main", &work, 2).unwrap();
        fs::write(work.join("README.md"), "bad change\n").unwrap();
        ws.stage_all(&work).unwrap();
        ws.commit(&work, "Break readme").unwrap();

        let reverted = ws.revert_head(&work).unwrap();
        assert_eq!(reverted, "Break readme");
        assert_eq!(fs::read_to_string(work.join("README.md")).unwrap(), "hello\n");

        ws.push(&work, &url, "main").unwrap();
        assert!(remote_head_message(&tmp, "main").starts_with("Revert \"Break readme\""));
    }

    #[test]
    fn revert_of_root_commit_is_rejected() {
        let (_tmp, url, work) = setup();
        let ws = workspace();
        ws.clone_branch(&url, "main", &work, 0).unwrap();
        assert!(matches!(
            ws.revert_head(&work),
            Err(WorkspaceError::NothingToRevert)
        ));
    }

    #[test]
    fn clone_of_missing_branch_fails() {
        let (_tmp, url, work) = setup();
        assert!(matches!(
            workspace().clone_branch(&url, "nope", &work, 1),
            Err(WorkspaceError::Git(_))
        ));
    }

    #[test]
    fn debug_hides_token() {
        let ws = GitWorkspace::new(Some("ghp_secret".into()), CommitIdentity::default());
        assert!(!format!("{ws:?}").contains("ghp_secret"));
    }
}
