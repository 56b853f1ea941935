//! `pull_request.opened`: post a model review of the new PR.

use git_context_engine::git_providers::ChangeRequestId;
use tracing::info;

use super::reply::{self, ReplyTarget};
use crate::errors::CoderResult;
use crate::generator::{GenerationRequest, ModelStrength, TextGenerator};
use crate::host::SourceHost;
use crate::orchestrator::Orchestrator;
use crate::prompts;
use crate::vcs::VersionControl;

pub async fn review_pull_request<G, H, V>(
    orch: &Orchestrator<G, H, V>,
    id: &ChangeRequestId,
) -> CoderResult<()>
where
    G: TextGenerator,
    H: SourceHost,
    V: VersionControl,
{
    let host = orch.host();
    let pr = host.get_pull_request(id).await?;
    let diff = host.get_pull_request_diff(id).await?;

    let context = format!(
        "Title: {}\n\nDescription:\n{}\n\nDiff:\n```diff\n{}\n```",
        pr.title,
        pr.body.as_deref().unwrap_or(""),
        diff.trim_end()
    );
    let review = orch
        .generator()
        .generate(GenerationRequest {
            prompt: prompts::PR_REVIEW,
            context,
            strength: ModelStrength::Strong,
            temperature: 0.7,
            stage: "review",
        })
        .await?;
    info!(pr = id.iid, len = review.len(), "review generated");

    reply::post(host, &ReplyTarget::Issue(id.clone()), &review).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoderConfig;
    use crate::testing::{FakeHost, FakeVcs, ScriptedGenerator};

    #[tokio::test]
    async fn review_is_posted_on_pull_request() {
        let orch = Orchestrator::new(
            ScriptedGenerator::new(["Looks good."]),
            FakeHost::default().with_pull(8, "feature/y", &[]),
            FakeVcs::default(),
            CoderConfig::default(),
        );

        review_pull_request(&orch, &ChangeRequestId::new("octo/repo", 8))
            .await
            .unwrap();

        let req = &orch.generator().requests()[0];
        assert_eq!(req.strength, ModelStrength::Strong);
        assert!(
            req.context
                .starts_with("Title: Greeting PR\n\nDescription:\nChanges the greeting")
        );
        assert!(req.context.contains("```diff\n--- a/hello.txt"));
        assert_eq!(orch.host().posted(), [(8, "Looks good.\n\nbot:ignore".to_string())]);
    }
}
