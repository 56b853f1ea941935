//! Text-generation providers behind two model profiles (strong/weak).
//!
//! Providers: OpenAI chat completions, Anthropic messages, local Ollama.
//! Everything is plain `async fn` over concrete clients; dispatch is by
//! [`config::llm_provider::LlmProvider`].

pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;

pub use config::default_config::{ModelProfiles, profiles_from_env};
pub use error_handler::AiLlmError;
pub use service_profiles::{LlmServiceProfiles, ModelStrength};
