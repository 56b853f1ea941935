//! `issues.opened`: turn an issue that addresses the bot into a PR.

use git_context_engine::git_providers::{ChangeRequestId, NewPullRequest};
use tracing::{debug, info};

use super::reply::{self, ReplyTarget};
use crate::context::ArtifactMeta;
use crate::errors::CoderResult;
use crate::generator::TextGenerator;
use crate::host::SourceHost;
use crate::orchestrator::{ModifyRequest, Orchestrator, issue_branch_name};
use crate::summary::FALLBACK_SUBJECT;
use crate::vcs::VersionControl;

pub async fn issue_to_pull_request<G, H, V>(
    orch: &Orchestrator<G, H, V>,
    id: &ChangeRequestId,
) -> CoderResult<()>
where
    G: TextGenerator,
    H: SourceHost,
    V: VersionControl,
{
    let host = orch.host();
    let issue = host.get_issue(id).await?;
    let body = issue.body.clone().unwrap_or_default();
    let trigger = orch.config().trigger_phrase.as_str();

    if !issue.title.contains(trigger) && !body.contains(trigger) {
        debug!(iid = id.iid, "issue does not address the bot");
        return Ok(());
    }

    let target = ReplyTarget::Issue(id.clone());
    reply::post(host, &target, reply::ISSUE_ACK).await?;

    let outcome = orch
        .modify_code(ModifyRequest {
            id: id.clone(),
            request_text: format!("{}\n\n{body}", issue.title),
            artifact: ArtifactMeta {
                title: Some(issue.title.clone()),
                body: issue.body.clone(),
                ..ArtifactMeta::default()
            },
        })
        .await;

    if !outcome.success {
        let error = outcome.error.as_deref().unwrap_or("unknown error");
        return reply::post(host, &target, &reply::issue_changes_failed(error)).await;
    }

    let explanation = outcome.explanation.unwrap_or_default();
    let files = outcome.changed_files.unwrap_or_default();
    let subject = outcome
        .commit_subject
        .unwrap_or_else(|| FALLBACK_SUBJECT.to_string());
    let repo = host.get_repository(&id.project).await?;

    let pr = host
        .create_pull_request(
            &id.project,
            &NewPullRequest {
                title: format!("AI: {subject}"),
                body: reply::pull_request_body(id.iid, &explanation, &files),
                head: outcome
                    .branch_name
                    .unwrap_or_else(|| issue_branch_name(id.iid)),
                base: repo.default_branch,
            },
        )
        .await?;
    info!(issue = id.iid, pr = pr.number, "pull request opened for issue");

    reply::post(
        host,
        &target,
        &reply::pull_request_created(pr.number, &explanation, &files),
    )
    .await
}
