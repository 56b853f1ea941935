//! Strong/weak model profiles loaded from environment variables.
//!
//! - **Strong** → code edits, plans, reviews, complex answers
//! - **Weak**   → commit subjects and short conversational replies
//!
//! # Environment variables
//!
//! Common:
//! - `AI_PROVIDER`      = `openai` (default) | `anthropic` | `ollama`
//! - `STRONG_AI_MODEL`  = strong model, falls back to `AI_MODEL`, then the provider default
//! - `WEAK_AI_MODEL`    = weak model, falls back to the provider default
//! - `LLM_MAX_TOKENS`   = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS` = optional HTTP timeout (u64, default 300)
//!
//! Provider-specific:
//! - OpenAI:    `OPENAI_API_KEY` (required), `OPENAI_URL` (default `https://api.openai.com`)
//! - Anthropic: `ANTHROPIC_API_KEY` (required), `ANTHROPIC_URL`
//!   (default `https://api.anthropic.com`)
//! - Ollama:    `OLLAMA_URL` or `OLLAMA_PORT`; models have no defaults

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, Result, env_opt, parse_opt_number, validate_http_endpoint,
    },
};

/// Strong and weak profiles resolved together, sharing provider/endpoint/key.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelProfiles {
    pub strong: LlmModelConfig,
    pub weak: LlmModelConfig,
}

/// Default `(strong, weak)` model ids per provider.
pub fn default_models(provider: LlmProvider) -> Option<(&'static str, &'static str)> {
    match provider {
        LlmProvider::OpenAI => Some(("gpt-4.1", "gpt-4.1-mini")),
        LlmProvider::Anthropic => Some(("claude-3-5-sonnet-latest", "claude-3-haiku-latest")),
        LlmProvider::Ollama => None,
    }
}

/// Reads both profiles from the process environment.
///
/// # Errors
/// - [`ConfigError::UnsupportedProvider`] for an unknown `AI_PROVIDER`
/// - [`ConfigError::MissingVar`] for a missing API key, endpoint, or Ollama model
/// - [`ConfigError::InvalidNumber`] for malformed numeric settings
pub fn profiles_from_env() -> Result<ModelProfiles> {
    profiles_from_lookup(|name| env_opt(name))
}

/// Same as [`profiles_from_env`], with an injectable variable source.
pub fn profiles_from_lookup<F>(lookup: F) -> Result<ModelProfiles>
where
    F: Fn(&'static str) -> Option<String>,
{
    let provider = match lookup("AI_PROVIDER") {
        Some(raw) => raw.parse::<LlmProvider>()?,
        None => LlmProvider::OpenAI,
    };

    let (endpoint, api_key) = match provider {
        LlmProvider::OpenAI => (
            lookup("OPENAI_URL").unwrap_or_else(|| "https://api.openai.com".into()),
            Some(lookup("OPENAI_API_KEY").ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?),
        ),
        LlmProvider::Anthropic => (
            lookup("ANTHROPIC_URL").unwrap_or_else(|| "https://api.anthropic.com".into()),
            Some(
                lookup("ANTHROPIC_API_KEY")
                    .ok_or(ConfigError::MissingVar("ANTHROPIC_API_KEY"))?,
            ),
        ),
        LlmProvider::Ollama => (ollama_endpoint(&lookup)?, None),
    };
    validate_http_endpoint("endpoint", &endpoint)?;

    let defaults = default_models(provider);
    let strong_model = lookup("STRONG_AI_MODEL")
        .or_else(|| lookup("AI_MODEL"))
        .or_else(|| defaults.map(|(s, _)| s.to_string()))
        .ok_or(ConfigError::MissingVar("STRONG_AI_MODEL or AI_MODEL"))?;
    let weak_model = lookup("WEAK_AI_MODEL")
        .or_else(|| defaults.map(|(_, w)| w.to_string()))
        .ok_or(ConfigError::MissingVar("WEAK_AI_MODEL"))?;

    let max_tokens: Option<u32> =
        parse_opt_number("LLM_MAX_TOKENS", lookup("LLM_MAX_TOKENS"), "expected u32")?;
    let timeout_secs: Option<u64> =
        parse_opt_number("LLM_TIMEOUT_SECS", lookup("LLM_TIMEOUT_SECS"), "expected u64")?;
    let timeout_secs = timeout_secs.or(Some(300));

    let strong = LlmModelConfig {
        provider,
        model: strong_model,
        endpoint: endpoint.clone(),
        api_key: api_key.clone(),
        max_tokens,
        temperature: Some(0.2),
        top_p: None,
        timeout_secs,
    };
    let weak = LlmModelConfig {
        model: weak_model,
        temperature: Some(0.7),
        ..strong.clone()
    };

    if strong.model.trim().is_empty() || weak.model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }

    Ok(ModelProfiles { strong, weak })
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint<F>(lookup: &F) -> Result<String>
where
    F: Fn(&'static str) -> Option<String>,
{
    if let Some(url) = lookup("OLLAMA_URL") {
        return Ok(url);
    }
    if let Some(port) = lookup("OLLAMA_PORT") {
        port.trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{}", port.trim()));
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |k: &'static str| map.get(k).cloned()
    }

    #[test]
    fn openai_defaults() {
        let p = profiles_from_lookup(vars(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(p.strong.provider, LlmProvider::OpenAI);
        assert_eq!(p.strong.model, "gpt-4.1");
        assert_eq!(p.weak.model, "gpt-4.1-mini");
        assert_eq!(p.strong.endpoint, "https://api.openai.com");
        assert_eq!(p.weak.temperature, Some(0.7));
        assert_eq!(p.strong.timeout_secs, Some(300));
    }

    #[test]
    fn ai_model_overrides_strong_only() {
        let p = profiles_from_lookup(vars(&[
            ("AI_PROVIDER", "anthropic"),
            ("ANTHROPIC_API_KEY", "k"),
            ("AI_MODEL", "claude-custom"),
        ]))
        .unwrap();
        assert_eq!(p.strong.model, "claude-custom");
        assert_eq!(p.weak.model, "claude-3-haiku-latest");
    }

    #[test]
    fn ollama_needs_explicit_models() {
        let err = profiles_from_lookup(vars(&[("AI_PROVIDER", "ollama"), ("OLLAMA_PORT", "11434")]))
            .unwrap_err();
        assert!(matches!(err, AiLlmError::Config(ConfigError::MissingVar(_))));

        let p = profiles_from_lookup(vars(&[
            ("AI_PROVIDER", "ollama"),
            ("OLLAMA_PORT", "11434"),
            ("AI_MODEL", "qwen3:14b"),
            ("WEAK_AI_MODEL", "qwen3:4b"),
        ]))
        .unwrap();
        assert_eq!(p.strong.endpoint, "http://localhost:11434");
        assert_eq!(p.weak.model, "qwen3:4b");
        assert!(p.strong.api_key.is_none());
    }

    #[test]
    fn missing_key_and_bad_numbers_are_reported() {
        assert!(matches!(
            profiles_from_lookup(vars(&[])),
            Err(AiLlmError::Config(ConfigError::MissingVar("OPENAI_API_KEY")))
        ));
        assert!(matches!(
            profiles_from_lookup(vars(&[("OPENAI_API_KEY", "k"), ("LLM_MAX_TOKENS", "lots")])),
            Err(AiLlmError::Config(ConfigError::InvalidNumber { var: "LLM_MAX_TOKENS", .. }))
        ));
    }
}
