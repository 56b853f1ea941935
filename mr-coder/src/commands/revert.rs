//! `{trigger} bot:revert`: undo the last commit on a PR's head branch.

use git_context_engine::git_providers::ChangeRequestId;
use tracing::{error, info, warn};

use super::reply::{self, ReplyTarget};
use crate::errors::CoderResult;
use crate::generator::TextGenerator;
use crate::host::SourceHost;
use crate::orchestrator::Orchestrator;
use crate::vcs::VersionControl;

/// The clone must reach HEAD's parent.
const REVERT_DEPTH: u32 = 2;

pub fn is_revert_command(body: &str, trigger: &str) -> bool {
    body.trim() == format!("{trigger} bot:revert")
}

/// Reverts HEAD of the PR head branch and reports the result on the PR.
/// Only host lookups propagate; git failures are reported as a reply.
pub async fn revert_last_commit<G, H, V>(
    orch: &Orchestrator<G, H, V>,
    id: &ChangeRequestId,
) -> CoderResult<()>
where
    G: TextGenerator,
    H: SourceHost,
    V: VersionControl,
{
    let pr = orch.host().get_pull_request(id).await?;
    let tmp = tempfile::Builder::new().prefix("github-revert-").tempdir()?;
    let root = tmp.path().join("checkout");

    let res: CoderResult<String> = async {
        let vcs = orch.vcs();
        vcs.clone_branch(&pr.head_clone_url, &pr.head_ref, &root, REVERT_DEPTH)
            .await?;
        let message = vcs.revert_head(&root).await?;
        vcs.push(&root, &pr.head_clone_url, &pr.head_ref).await?;
        Ok(message)
    }
    .await;

    if let Err(e) = tmp.close() {
        warn!(error = %e, "temporary checkout cleanup failed");
    }

    let body = match res {
        Ok(message) => {
            info!(branch = %pr.head_ref, reverted = %message, "last commit reverted");
            reply::reverted(&message)
        }
        Err(e) => {
            error!(branch = %pr.head_ref, error = %e, "revert failed");
            reply::revert_failed(&e.to_string())
        }
    };
    reply::post(orch.host(), &ReplyTarget::Issue(id.clone()), &body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoderConfig;
    use crate::testing::{FakeHost, FakeVcs, ScriptedGenerator};

    #[test]
    fn revert_command_must_match_exactly() {
        assert!(is_revert_command("  @bot bot:revert \n", "@bot"));
        assert!(!is_revert_command("@bot bot:revert please", "@bot"));
    }

    #[tokio::test]
    async fn successful_revert_is_reported() {
        let vcs = FakeVcs::default().with_revert("Add greeting");
        let host = FakeHost::default().with_pull(9, "feature/x", &[]);
        let orch =
            Orchestrator::new(ScriptedGenerator::failing(), host, vcs, CoderConfig::default());

        revert_last_commit(&orch, &ChangeRequestId::new("octo/repo", 9))
            .await
            .unwrap();

        assert_eq!(
            orch.vcs().calls(),
            [
                "clone https://github.com/octo/repo.git feature/x depth=2",
                "revert_head",
                "push https://github.com/octo/repo.git feature/x",
            ]
        );
        let posted = orch.host().posted();
        assert_eq!(
            posted[0].1,
            "✅ Successfully reverted the previous commit: \"Add greeting\"\n\nbot:ignore"
        );
        assert!(orch.vcs().roots().iter().all(|r| !r.exists()));
    }

    #[tokio::test]
    async fn failed_revert_is_reported_without_push() {
        let host = FakeHost::default().with_pull(9, "feature/x", &[]);
        let orch = Orchestrator::new(
            ScriptedGenerator::failing(),
            host,
            FakeVcs::default(),
            CoderConfig::default(),
        );

        revert_last_commit(&orch, &ChangeRequestId::new("octo/repo", 9))
            .await
            .unwrap();

        assert!(!orch.vcs().calls().iter().any(|c| c.starts_with("push")));
        assert!(orch.host().posted()[0]
            .1
            .starts_with("❌ Failed to revert the previous commit:"));
    }
}
