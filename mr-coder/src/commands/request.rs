//! Shared request flow for issue, PR and review comments: either run the
//! orchestrator or answer conversationally.

use git_context_engine::git_providers::ChangeRequestId;
use tracing::info;

use super::reply;
use crate::context::ArtifactMeta;
use crate::errors::CoderResult;
use crate::generator::{GenerationRequest, ModelStrength, TextGenerator};
use crate::host::SourceHost;
use crate::orchestrator::{ModifyRequest, Orchestrator};
use crate::prompts;
use crate::vcs::VersionControl;

const CODE_VERBS: [&str; 6] = ["change", "modify", "update", "fix", "implement", "refactor"];
const FILE_DIRECTIVES: [&str; 2] = [".add-files", "/add"];
const COMPLEX_WORDS: [&str; 3] = ["explain", "how", "why"];

/// Addressed to the bot and asking for an edit (or naming files to add).
pub fn is_code_request(text: &str, trigger: &str) -> bool {
    text.contains(trigger)
        && (CODE_VERBS.iter().any(|v| text.contains(v))
            || FILE_DIRECTIVES.iter().any(|d| text.contains(d)))
}

pub fn is_complex_question(text: &str) -> bool {
    text.chars().count() > 100 || COMPLEX_WORDS.iter().any(|w| text.contains(w))
}

/// Text given to the model for a conversational answer.
pub fn conversation_context(text: &str, iid: u64, artifact: &ArtifactMeta) -> String {
    let mut parts = vec![format!("Comment: {text}\nContext: PR #{iid}")];
    if let Some(title) = artifact.title.as_deref().filter(|t| !t.trim().is_empty()) {
        parts.push(format!("Title: {title}"));
    }
    if let Some(body) = artifact.body.as_deref().filter(|b| !b.trim().is_empty()) {
        parts.push(format!("Description:\n{body}"));
    }
    if let Some(diff) = artifact.diff.as_deref().filter(|d| !d.trim().is_empty()) {
        parts.push(format!("Diff:\n```diff\n{}\n```", diff.trim_end()));
    }
    if let Some(anchor) = &artifact.review_anchor {
        let line = anchor.line.map(|l| l.to_string()).unwrap_or_else(|| "?".into());
        parts.push(format!(
            "Review comment on {} line {line}:\n{}",
            anchor.path, anchor.diff_hunk
        ));
    }
    parts.join("\n\n")
}

/// Produces the reply body for one request.
///
/// Orchestrator failures become a failure reply; a failing conversational
/// generation is returned as an error for the caller to report.
pub async fn respond<G, H, V>(
    orch: &Orchestrator<G, H, V>,
    id: &ChangeRequestId,
    text: &str,
    artifact: ArtifactMeta,
) -> CoderResult<String>
where
    G: TextGenerator,
    H: SourceHost,
    V: VersionControl,
{
    let trigger = orch.config().trigger_phrase.as_str();

    if is_code_request(text, trigger) {
        info!(iid = id.iid, "code modification request");
        let outcome = orch
            .modify_code(ModifyRequest {
                id: id.clone(),
                request_text: text.to_string(),
                artifact,
            })
            .await;
        return Ok(if outcome.success {
            reply::changes_pushed(
                outcome.explanation.as_deref().unwrap_or_default(),
                outcome.changed_files.as_deref().unwrap_or_default(),
            )
        } else {
            reply::modify_failed(outcome.error.as_deref().unwrap_or("unknown error"))
        });
    }

    let strength = if is_complex_question(text) {
        ModelStrength::Strong
    } else {
        ModelStrength::Weak
    };
    info!(iid = id.iid, strength = ?strength, "conversational request");
    orch.generator()
        .generate(GenerationRequest {
            prompt: prompts::COMMENT_RESPONSE,
            context: conversation_context(text, id.iid, &artifact),
            strength,
            temperature: 0.7,
            stage: "comment",
        })
        .await
}
