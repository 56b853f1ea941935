//! Anthropic messages client.
//!
//! - POST {endpoint}/v1/messages (non-streaming)
//!
//! The system instruction goes into the top-level `system` field and the
//! first text block of the answer is returned.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet,
        transport_error,
    },
};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Thin client for the Anthropic API.
#[derive(Debug)]
pub struct AnthropicService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    timeout: Duration,
    url_messages: String,
}

impl AnthropicService {
    /// Creates a new [`AnthropicService`].
    ///
    /// # Errors
    /// Same validation as the OpenAI client: provider, API key, endpoint scheme.
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Anthropic {
            return Err(
                ProviderError::new(Provider::Anthropic, ProviderErrorKind::InvalidProvider).into(),
            );
        }

        let api_key = cfg.api_key.clone().ok_or_else(|| {
            ProviderError::new(Provider::Anthropic, ProviderErrorKind::MissingApiKey)
        })?;

        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ProviderError::new(
                Provider::Anthropic,
                ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone()),
            )
            .into());
        }

        let timeout = cfg.timeout_or_default();

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "x-api-key",
            header::HeaderValue::from_str(&api_key).map_err(|e| {
                ProviderError::new(
                    Provider::Anthropic,
                    ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
                )
            })?,
        );
        headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let url_messages = format!("{}/v1/messages", endpoint.trim_end_matches('/'));

        info!(model = %cfg.model, endpoint = %cfg.endpoint, "AnthropicService initialized");

        Ok(Self {
            client,
            cfg,
            timeout,
            url_messages,
        })
    }

    /// Single non-streaming completion.
    pub async fn generate(
        &self,
        system: &str,
        user: &str,
        temperature: Option<f32>,
    ) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = MessagesRequest::from_cfg(&self.cfg, system, user, temperature);

        debug!(model = %self.cfg.model, user_len = user.len(), "POST {}", self.url_messages);

        let resp = self
            .client
            .post(&self.url_messages)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_messages.clone();
            let snippet = make_snippet(&resp.text().await.unwrap_or_default());
            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                "Anthropic /v1/messages returned non-success status"
            );
            return Err(ProviderError::new(
                Provider::Anthropic,
                ProviderErrorKind::HttpStatus(HttpError {
                    status,
                    url,
                    snippet,
                }),
            )
            .into());
        }

        let out: MessagesResponse = resp.json().await.map_err(|e| {
            ProviderError::new(
                Provider::Anthropic,
                ProviderErrorKind::Decode(format!("serde error: {e}; expected `content[].text`")),
            )
        })?;

        let text = out.first_text().ok_or_else(|| {
            ProviderError::new(Provider::Anthropic, ProviderErrorKind::EmptyChoices)
        })?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            out_len = text.len(),
            "messages completion completed"
        );
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    system: &'a str,
    messages: [UserMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

impl<'a> MessagesRequest<'a> {
    fn from_cfg(
        cfg: &'a LlmModelConfig,
        system: &'a str,
        user: &'a str,
        temperature: Option<f32>,
    ) -> Self {
        Self {
            model: &cfg.model,
            max_tokens: cfg.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system,
            messages: [UserMessage {
                role: "user",
                content: user,
            }],
            temperature: temperature.or(cfg.temperature),
            top_p: cfg.top_p,
        }
    }
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    fn first_text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|b| b.kind == "text")
            .and_then(|b| b.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_shape() {
        let cfg = LlmModelConfig {
            provider: LlmProvider::Anthropic,
            model: "claude-3-haiku-latest".into(),
            endpoint: "https://api.anthropic.com".into(),
            api_key: Some("k".into()),
            max_tokens: None,
            temperature: Some(0.7),
            top_p: None,
            timeout_secs: None,
        };
        let req = MessagesRequest::from_cfg(&cfg, "sys", "hi", None);
        let json = serde_json::to_value(req).unwrap();
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["system"], "sys");
        assert_eq!(json["messages"][0]["role"], "user");

        let json = serde_json::to_value(MessagesRequest::from_cfg(&cfg, "", "hi", None)).unwrap();
        assert!(json.get("system").is_none());
    }

    #[test]
    fn picks_first_text_block() {
        let raw = r#"{"content":[{"type":"tool_use","id":"x"},{"type":"text","text":"PLAN: a"}]}"#;
        let resp: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.first_text().as_deref(), Some("PLAN: a"));
    }
}
