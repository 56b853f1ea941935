use mr_coder::BotEvent;
use serde::Deserialize;

/// Subset of a GitHub webhook delivery shared by the events the bot handles.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub action: Option<String>,
    pub repository: Option<RepositoryRef>,
    #[serde(default)]
    pub issue: Option<NumberRef>,
    #[serde(default)]
    pub pull_request: Option<NumberRef>,
    #[serde(default)]
    pub comment: Option<CommentRef>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryRef {
    /// "owner/repo"
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct NumberRef {
    pub number: u64,
}

#[derive(Debug, Deserialize)]
pub struct CommentRef {
    pub id: u64,
}

/// Query string of the webhook URL.
#[derive(Debug, Deserialize)]
pub struct SecretQuery {
    #[serde(default)]
    pub secret: Option<String>,
}

/// Maps `X-GitHub-Event` + payload to a bot event; `None` for anything the
/// bot does not act on.
pub fn to_bot_event(event: &str, payload: &WebhookPayload) -> Option<BotEvent> {
    let project = payload.repository.as_ref()?.full_name.clone();
    let action = payload.action.as_deref().unwrap_or_default();

    match (event, action) {
        ("issue_comment", "created") => Some(BotEvent::IssueComment {
            project,
            issue_number: payload.issue.as_ref()?.number,
            comment_id: payload.comment.as_ref()?.id,
        }),
        ("pull_request_review_comment", "created") => Some(BotEvent::ReviewComment {
            project,
            pr_number: payload.pull_request.as_ref()?.number,
            comment_id: payload.comment.as_ref()?.id,
        }),
        ("issues", "opened") => Some(BotEvent::IssueOpened {
            project,
            issue_number: payload.issue.as_ref()?.number,
        }),
        ("pull_request", "opened") => Some(BotEvent::PullRequestOpened {
            project,
            pr_number: payload.pull_request.as_ref()?.number,
        }),
        _ => None,
    }
}
