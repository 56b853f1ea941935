//! GitHub bot commands: webhook events in, replies (and pushes) out.
//!
//! | event                                  | handler                        |
//! |----------------------------------------|--------------------------------|
//! | `issue_comment.created`                | revert or shared request flow  |
//! | `pull_request_review_comment.created`  | shared request flow, threaded  |
//! | `issues.opened`                        | issue → PR                     |
//! | `pull_request.opened`                  | model review                   |

pub mod issue;
pub mod reply;
pub mod request;
pub mod revert;
pub mod review;

use git_context_engine::git_providers::ChangeRequestId;
use tracing::{debug, error, info, instrument};

use crate::config::CoderConfig;
use crate::context::{ArtifactMeta, ReviewAnchor};
use crate::errors::CoderResult;
use crate::generator::TextGenerator;
use crate::host::SourceHost;
use crate::orchestrator::Orchestrator;
use crate::vcs::VersionControl;

use reply::{IGNORE_MARKER, ReplyTarget};

/// A webhook event the bot acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotEvent {
    IssueComment {
        project: String,
        issue_number: u64,
        comment_id: u64,
    },
    ReviewComment {
        project: String,
        pr_number: u64,
        comment_id: u64,
    },
    IssueOpened {
        project: String,
        issue_number: u64,
    },
    PullRequestOpened {
        project: String,
        pr_number: u64,
    },
}

impl BotEvent {
    fn name(&self) -> &'static str {
        match self {
            BotEvent::IssueComment { .. } => "issue_comment",
            BotEvent::ReviewComment { .. } => "review_comment",
            BotEvent::IssueOpened { .. } => "issue_opened",
            BotEvent::PullRequestOpened { .. } => "pull_request_opened",
        }
    }

    /// Where an error escaping the handler is reported.
    fn error_target(&self) -> ReplyTarget {
        match self {
            BotEvent::IssueComment {
                project,
                issue_number,
                ..
            }
            | BotEvent::IssueOpened {
                project,
                issue_number,
            } => ReplyTarget::Issue(ChangeRequestId::new(project, *issue_number)),
            BotEvent::PullRequestOpened { project, pr_number } => {
                ReplyTarget::Issue(ChangeRequestId::new(project, *pr_number))
            }
            BotEvent::ReviewComment {
                project,
                pr_number,
                comment_id,
            } => ReplyTarget::ReviewThread {
                pr: ChangeRequestId::new(project, *pr_number),
                comment_id: *comment_id,
            },
        }
    }
}

pub struct GitHubBot<G, H, V> {
    orch: Orchestrator<G, H, V>,
}

impl<G, H, V> GitHubBot<G, H, V>
where
    G: TextGenerator,
    H: SourceHost,
    V: VersionControl,
{
    pub fn new(generator: G, host: H, vcs: V, cfg: CoderConfig) -> Self {
        Self {
            orch: Orchestrator::new(generator, host, vcs, cfg),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator<G, H, V> {
        &self.orch
    }

    fn trigger(&self) -> &str {
        &self.orch.config().trigger_phrase
    }

    /// Contains the trigger and is not one of the bot's own messages.
    pub fn is_actionable(&self, body: &str) -> bool {
        body.contains(self.trigger()) && !body.contains(IGNORE_MARKER)
    }

    /// Handles one event. Errors are reported to the requester, never returned.
    #[instrument(skip_all, fields(event = event.name()))]
    pub async fn handle(&self, event: BotEvent) {
        let res = match &event {
            BotEvent::IssueComment {
                project,
                issue_number,
                comment_id,
            } => self.on_issue_comment(project, *issue_number, *comment_id).await,
            BotEvent::ReviewComment {
                project,
                pr_number,
                comment_id,
            } => self.on_review_comment(project, *pr_number, *comment_id).await,
            BotEvent::IssueOpened {
                project,
                issue_number,
            } => {
                let id = ChangeRequestId::new(project, *issue_number);
                issue::issue_to_pull_request(&self.orch, &id).await
            }
            BotEvent::PullRequestOpened { project, pr_number } => {
                let id = ChangeRequestId::new(project, *pr_number);
                review::review_pull_request(&self.orch, &id).await
            }
        };

        if let Err(e) = res {
            error!(error = %e, "event handling failed");
            let body = reply::request_failed(&e.to_string());
            reply::post_quietly(self.orch.host(), &event.error_target(), &body).await;
        }
    }

    async fn on_issue_comment(
        &self,
        project: &str,
        issue_number: u64,
        comment_id: u64,
    ) -> CoderResult<()> {
        let host = self.orch.host();
        let comment = host.get_issue_comment(project, comment_id).await?;
        if !self.is_actionable(&comment.body) {
            debug!(comment_id, "comment not addressed to the bot");
            return Ok(());
        }

        let id = ChangeRequestId::new(project, issue_number);
        if revert::is_revert_command(&comment.body, self.trigger()) {
            info!(iid = issue_number, "revert requested");
            return revert::revert_last_commit(&self.orch, &id).await;
        }

        let issue = host.get_issue(&id).await?;
        let comments = host
            .list_issue_comments(&id)
            .await?
            .into_iter()
            .filter(|c| c.id != comment_id && !c.body.contains(IGNORE_MARKER))
            .collect();
        let mut artifact = ArtifactMeta {
            title: Some(issue.title),
            body: issue.body,
            comments,
            ..ArtifactMeta::default()
        };
        if issue.is_pull_request {
            let pr = host.get_pull_request(&id).await?;
            artifact.title = Some(pr.title);
            artifact.body = pr.body;
            artifact.diff = Some(host.get_pull_request_diff(&id).await?);
        }

        let answer = match request::respond(&self.orch, &id, &comment.body, artifact).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "request failed");
                reply::request_failed(&e.to_string())
            }
        };
        let body = format!("{}\n\n{answer}", reply::quote(&comment.body));
        reply::post(host, &ReplyTarget::Issue(id), &body).await
    }

    async fn on_review_comment(
        &self,
        project: &str,
        pr_number: u64,
        comment_id: u64,
    ) -> CoderResult<()> {
        let host = self.orch.host();
        let id = ChangeRequestId::new(project, pr_number);
        let comment = host.get_review_comment(project, comment_id).await?;
        if !self.is_actionable(&comment.body) {
            debug!(comment_id, "review comment not addressed to the bot");
            return Ok(());
        }

        let pr = host.get_pull_request(&id).await?;
        let diff = host.get_pull_request_diff(&id).await?;
        let artifact = ArtifactMeta {
            title: Some(pr.title),
            body: pr.body,
            diff: Some(diff),
            review_anchor: Some(ReviewAnchor::from(&comment)),
            ..ArtifactMeta::default()
        };

        let answer = request::respond(&self.orch, &id, &comment.body, artifact).await?;
        reply::post(host, &ReplyTarget::ReviewThread { pr: id, comment_id }, &answer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeHost, FakeVcs, ScriptedGenerator};

    const EDIT: &str = "Greets the world.\n\nhello.txt\n```\n<<<<<<< SEARCH\nhello\n=======\nhello world\n>>>>>>> REPLACE\n```\n";

    type TestBot = GitHubBot<ScriptedGenerator, FakeHost, FakeVcs>;

    fn bot(generator: ScriptedGenerator, host: FakeHost, vcs: FakeVcs) -> TestBot {
        GitHubBot::new(generator, host, vcs, CoderConfig::default())
    }

    fn comment_event(issue_number: u64, comment_id: u64) -> BotEvent {
        BotEvent::IssueComment {
            project: "octo/repo".into(),
            issue_number,
            comment_id,
        }
    }

    #[tokio::test]
    async fn own_messages_and_untriggered_comments_are_skipped() {
        let host = FakeHost::default()
            .with_pull(7, "feature/greet", &["hello.txt"])
            .with_issue_comment(7, 1, "@github-ai-bot fix it\n\nbot:ignore")
            .with_issue_comment(7, 2, "just chatting");
        let bot = bot(ScriptedGenerator::failing(), host, FakeVcs::default());

        bot.handle(comment_event(7, 1)).await;
        bot.handle(comment_event(7, 2)).await;

        assert!(bot.orchestrator().host().posted().is_empty());
        assert_eq!(bot.orchestrator().generator().calls(), 0);
    }

    #[tokio::test]
    async fn pr_comment_runs_modification_and_quotes_request() {
        let host = FakeHost::default()
            .with_pull(7, "feature/greet", &["hello.txt"])
            .with_issue_comment(7, 1, "@github-ai-bot change the greeting");
        let bot = bot(
            ScriptedGenerator::new(["PLAN: edit", EDIT, "Greet the world"]),
            host,
            FakeVcs::seeded(&[("hello.txt", "hello\n")]),
        );

        bot.handle(comment_event(7, 1)).await;

        let posted = bot.orchestrator().host().posted();
        assert_eq!(posted.len(), 1);
        let (iid, body) = &posted[0];
        assert_eq!(*iid, 7);
        assert!(body.starts_with(
            "> @github-ai-bot change the greeting\n\n✅ I've made the requested changes and pushed them to this PR."
        ));
        assert!(body.contains("**Changes made:**\nGreets the world."));
        assert!(body.contains("- `hello.txt`"));
        assert!(body.ends_with("\n\nbot:ignore"));

        let plan_ctx = &bot.orchestrator().generator().requests()[0].context;
        assert!(plan_ctx.contains("Diff:\n```diff"));
    }

    #[tokio::test]
    async fn revert_command_dispatches_to_revert() {
        let host = FakeHost::default()
            .with_pull(7, "feature/greet", &[])
            .with_issue_comment(7, 3, "@github-ai-bot bot:revert");
        let vcs = FakeVcs::default().with_revert("Greet the world");
        let bot = bot(ScriptedGenerator::failing(), host, vcs);

        bot.handle(comment_event(7, 3)).await;

        assert!(bot.orchestrator().vcs().calls().contains(&"revert_head".to_string()));
        assert!(bot.orchestrator().host().posted()[0]
            .1
            .starts_with("✅ Successfully reverted the previous commit: \"Greet the world\""));
    }

    #[tokio::test]
    async fn review_comment_reply_goes_to_thread() {
        let host = FakeHost::default()
            .with_pull(7, "feature/greet", &["hello.txt"])
            .with_review_comment(11, "@github-ai-bot why this line?");
        let bot = bot(ScriptedGenerator::new(["Because."]), host, FakeVcs::default());

        bot.handle(BotEvent::ReviewComment {
            project: "octo/repo".into(),
            pr_number: 7,
            comment_id: 11,
        })
        .await;

        let replies = bot.orchestrator().host().review_replies();
        assert_eq!(replies, [(7, 11, "Because.\n\nbot:ignore".to_string())]);
        let req = &bot.orchestrator().generator().requests()[0];
        assert!(req.context.contains("Review comment on hello.txt line 1:"));
    }

    #[tokio::test]
    async fn review_comment_errors_are_threaded() {
        let host = FakeHost::default()
            .with_pull(7, "feature/greet", &[])
            .with_review_comment(11, "@github-ai-bot what now");
        let bot = bot(ScriptedGenerator::failing(), host, FakeVcs::default());

        bot.handle(BotEvent::ReviewComment {
            project: "octo/repo".into(),
            pr_number: 7,
            comment_id: 11,
        })
        .await;

        let replies = bot.orchestrator().host().review_replies();
        assert_eq!(replies.len(), 1);
        assert!(replies[0]
            .2
            .starts_with("❌ I encountered an error while processing your request:"));
    }

    #[tokio::test]
    async fn missing_comment_is_reported_on_issue() {
        let bot = bot(ScriptedGenerator::failing(), FakeHost::default(), FakeVcs::default());
        bot.handle(comment_event(5, 99)).await;
        let posted = bot.orchestrator().host().posted();
        assert_eq!(posted.len(), 1);
        assert!(posted[0].1.contains("not found"));
    }
}
