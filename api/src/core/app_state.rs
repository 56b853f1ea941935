use std::sync::Arc;

use ai_llm_service::{LlmServiceProfiles, error_handler::env_opt, profiles_from_env};
use git_context_engine::{GitHubClient, ProviderConfig};
use mr_coder::{CoderConfig, GitHubBot};
use services::{CommitIdentity, GitWorkspace};
use tracing::{info, warn};

use crate::error_handler::AppResult;

/// The bot wired to its production collaborators.
pub type Bot = GitHubBot<LlmServiceProfiles, GitHubClient, GitWorkspace>;

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<Bot>,
    /// Shared secret expected in the webhook `secret` query parameter.
    pub trigger_secret: String,
}

impl AppState {
    /// Builds the bot from environment variables (LLM profiles, GitHub
    /// token, git identity, bot settings).
    pub fn from_env() -> AppResult<Self> {
        let profiles = profiles_from_env()?;
        info!(
            provider = ?profiles.strong.provider,
            strong = %profiles.strong.model,
            weak = %profiles.weak.model,
            "llm profiles loaded"
        );
        let generator = LlmServiceProfiles::from_profiles(profiles);

        let provider = ProviderConfig::from_env()?;
        let workspace = GitWorkspace::new(Some(provider.token.clone()), CommitIdentity::from_env());
        let host = GitHubClient::from_config(provider)?;

        let cfg = CoderConfig::from_env()?;
        info!(trigger = %cfg.trigger_phrase, rounds = cfg.patch_max_rounds, "bot configured");

        let trigger_secret = env_opt("TRIGGER_SECRET").unwrap_or_default();
        if trigger_secret.is_empty() {
            warn!("TRIGGER_SECRET is not set; webhook calls will be refused");
        }

        Ok(Self {
            bot: Arc::new(GitHubBot::new(generator, host, workspace, cfg)),
            trigger_secret,
        })
    }
}
