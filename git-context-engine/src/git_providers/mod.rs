//! Provider facade. Only GitHub is supported; the client is used directly
//! through [`GitHubClient`].

pub mod github;
pub mod types;

pub use github::GitHubClient;
pub use types::*;

use tracing::debug;

use crate::errors::{GitContextEngineConfigError, GitContextEngineResult};

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Runtime configuration for the provider client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API base, e.g. "https://api.github.com".
    pub base_api: String,
    /// Access token (PAT or app installation token).
    pub token: String,
}

impl ProviderConfig {
    /// Reads `GITHUB_TOKEN` (required) and `GITHUB_API_BASE` (optional).
    pub fn from_env() -> GitContextEngineResult<Self> {
        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(GitContextEngineConfigError::MissingToken)?;
        let base_api = std::env::var("GITHUB_API_BASE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GITHUB_API.to_string());
        Ok(Self { base_api, token })
    }
}

impl GitHubClient {
    /// Constructs a client from configuration with a stable user agent.
    pub fn from_config(cfg: ProviderConfig) -> GitContextEngineResult<Self> {
        debug!("Initializing GitHub client: base_api={}", cfg.base_api);

        if cfg.token.trim().is_empty() {
            return Err(GitContextEngineConfigError::MissingToken.into());
        }
        if !(cfg.base_api.starts_with("http://") || cfg.base_api.starts_with("https://")) {
            return Err(GitContextEngineConfigError::InvalidBaseUrl(cfg.base_api).into());
        }

        let client = reqwest::Client::builder()
            .user_agent("mr-ai-coder/0.1")
            .build()?;

        Ok(GitHubClient::new(client, cfg.base_api, &cfg.token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GitContextEngineError;

    #[test]
    fn from_config_rejects_empty_token() {
        let err = GitHubClient::from_config(ProviderConfig {
            base_api: DEFAULT_GITHUB_API.into(),
            token: "  ".into(),
        })
        .unwrap_err();
        assert!(matches!(
            err,
            GitContextEngineError::Config(GitContextEngineConfigError::MissingToken)
        ));
    }

    #[test]
    fn from_config_rejects_non_http_base() {
        let err = GitHubClient::from_config(ProviderConfig {
            base_api: "ftp://example".into(),
            token: "t".into(),
        })
        .unwrap_err();
        assert!(matches!(
            err,
            GitContextEngineError::Config(GitContextEngineConfigError::InvalidBaseUrl(_))
        ));
    }
}
