//! Version-control capability. Every operation receives the working root
//! explicitly; nothing here changes the process working directory.

use std::future::Future;
use std::path::{Path, PathBuf};

use services::{GitWorkspace, WorkspaceError};

use crate::errors::CoderResult;

pub trait VersionControl: Send + Sync {
    /// Clones one branch of `url` into `dest` (`depth` 0 = full history).
    fn clone_branch(
        &self,
        url: &str,
        branch: &str,
        dest: &Path,
        depth: u32,
    ) -> impl Future<Output = CoderResult<()>> + Send;

    fn checkout_new_branch(
        &self,
        root: &Path,
        name: &str,
    ) -> impl Future<Output = CoderResult<()>> + Send;

    fn stage_all(&self, root: &Path) -> impl Future<Output = CoderResult<()>> + Send;

    /// Returns the new commit id.
    fn commit(&self, root: &Path, message: &str)
    -> impl Future<Output = CoderResult<String>> + Send;

    fn push(
        &self,
        root: &Path,
        url: &str,
        branch: &str,
    ) -> impl Future<Output = CoderResult<()>> + Send;

    /// Reverts HEAD and returns the message of the reverted commit.
    fn revert_head(&self, root: &Path) -> impl Future<Output = CoderResult<String>> + Send;
}

/// Runs a blocking libgit2 call on the blocking pool.
async fn blocking<T, F>(f: F) -> CoderResult<T>
where
    F: FnOnce() -> services::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f)
        .await
        .map_err(WorkspaceError::from)??)
}

impl VersionControl for GitWorkspace {
    async fn clone_branch(
        &self,
        url: &str,
        branch: &str,
        dest: &Path,
        depth: u32,
    ) -> CoderResult<()> {
        let (ws, url, branch) = (self.clone(), url.to_string(), branch.to_string());
        let dest = owned(dest);
        blocking(move || ws.clone_branch(&url, &branch, &dest, depth)).await
    }

    async fn checkout_new_branch(&self, root: &Path, name: &str) -> CoderResult<()> {
        let (ws, root, name) = (self.clone(), owned(root), name.to_string());
        blocking(move || ws.checkout_new_branch(&root, &name)).await
    }

    async fn stage_all(&self, root: &Path) -> CoderResult<()> {
        let (ws, root) = (self.clone(), owned(root));
        blocking(move || ws.stage_all(&root)).await
    }

    async fn commit(&self, root: &Path, message: &str) -> CoderResult<String> {
        let (ws, root, message) = (self.clone(), owned(root), message.to_string());
        blocking(move || ws.commit(&root, &message).map(|oid| oid.to_string())).await
    }

    async fn push(&self, root: &Path, url: &str, branch: &str) -> CoderResult<()> {
        let (ws, root) = (self.clone(), owned(root));
        let (url, branch) = (url.to_string(), branch.to_string());
        blocking(move || ws.push(&root, &url, &branch)).await
    }

    async fn revert_head(&self, root: &Path) -> CoderResult<String> {
        let (ws, root) = (self.clone(), owned(root));
        blocking(move || ws.revert_head(&root)).await
    }
}

fn owned(p: &Path) -> PathBuf {
    p.to_path_buf()
}
