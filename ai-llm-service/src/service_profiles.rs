//! Shared LLM service with two profiles: `strong` and `weak`.
//!
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (provider+endpoint+model+key+timeout).
//! - Dispatches each call to the provider of the selected profile.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::config::default_config::profiles_from_env;
//! use ai_llm_service::service_profiles::{LlmServiceProfiles, ModelStrength};
//!
//! # async fn run() -> Result<(), ai_llm_service::error_handler::AiLlmError> {
//! let svc = Arc::new(LlmServiceProfiles::from_profiles(profiles_from_env()?));
//! let txt = svc
//!     .generate(ModelStrength::Weak, "Answer briefly.", "What is Rust?", Some(0.7))
//!     .await?;
//! println!("{txt}");
//! # Ok(()) }
//! ```

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    config::{
        default_config::ModelProfiles, llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::AiLlmError,
    services::{
        anthropic_service::AnthropicService, ollama_service::OllamaService,
        open_ai_service::OpenAiService,
    },
};

/// Which profile a call should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStrength {
    /// Higher-quality model: edits, plans, reviews.
    Strong,
    /// Cheaper model: commit subjects, short replies.
    Weak,
}

/// Shared service managing the **strong** and **weak** profiles.
pub struct LlmServiceProfiles {
    strong: LlmModelConfig,
    weak: LlmModelConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,
    openai: RwLock<HashMap<ClientKey, Arc<OpenAiService>>>,
    anthropic: RwLock<HashMap<ClientKey, Arc<AnthropicService>>>,
}

impl LlmServiceProfiles {
    /// Creates a service; `weak_opt = None` falls back to the strong profile.
    pub fn new(strong: LlmModelConfig, weak_opt: Option<LlmModelConfig>) -> Self {
        let weak = weak_opt.unwrap_or_else(|| strong.clone());
        Self {
            strong,
            weak,
            ollama: RwLock::new(HashMap::new()),
            openai: RwLock::new(HashMap::new()),
            anthropic: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_profiles(p: ModelProfiles) -> Self {
        Self::new(p.strong, Some(p.weak))
    }

    /// Generates text with the selected profile.
    ///
    /// - `system`: instruction prompt (system role).
    /// - `user`: the context/question (user role).
    /// - `temperature`: per-call override of the profile default.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if client construction or the provider call fails.
    pub async fn generate(
        &self,
        strength: ModelStrength,
        system: &str,
        user: &str,
        temperature: Option<f32>,
    ) -> Result<String, AiLlmError> {
        let cfg = self.profile(strength);
        debug!(?strength, provider = ?cfg.provider, model = %cfg.model, "generate");

        match cfg.provider {
            LlmProvider::Ollama => {
                let cli = get_or_init(&self.ollama, cfg, OllamaService::new).await?;
                cli.generate(system, user, temperature).await
            }
            LlmProvider::OpenAI => {
                let cli = get_or_init(&self.openai, cfg, OpenAiService::new).await?;
                cli.generate(system, user, temperature).await
            }
            LlmProvider::Anthropic => {
                let cli = get_or_init(&self.anthropic, cfg, AnthropicService::new).await?;
                cli.generate(system, user, temperature).await
            }
        }
    }

    /// Returns the config backing a profile.
    pub fn profile(&self, strength: ModelStrength) -> &LlmModelConfig {
        match strength {
            ModelStrength::Strong => &self.strong,
            ModelStrength::Weak => &self.weak,
        }
    }
}

/// Looks up a cached client or builds and caches a new one.
async fn get_or_init<T, F>(
    cache: &RwLock<HashMap<ClientKey, Arc<T>>>,
    cfg: &LlmModelConfig,
    build: F,
) -> Result<Arc<T>, AiLlmError>
where
    F: FnOnce(LlmModelConfig) -> Result<T, AiLlmError>,
{
    let key = ClientKey::from(cfg);
    if let Some(cli) = cache.read().await.get(&key).cloned() {
        return Ok(cli);
    }
    let mut w = cache.write().await;
    if let Some(cli) = w.get(&key).cloned() {
        return Ok(cli);
    }
    let cli = Arc::new(build(cfg.clone())?);
    w.insert(key, cli.clone());
    Ok(cli)
}

/// Internal cache key to identify unique client configs.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}
