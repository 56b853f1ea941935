//! Text-generation capability used by the core.
//!
//! The orchestrator receives a generator at construction time; there is no
//! process-wide client. `LlmServiceProfiles` is the production implementation.

use std::future::Future;
use std::time::Instant;

use ai_llm_service::LlmServiceProfiles;
pub use ai_llm_service::ModelStrength;
use tracing::{debug, warn};

use crate::errors::CoderResult;
use crate::telemetry::prompt_dump;

/// One generator round-trip: `prompt` is the system instruction, `context`
/// the user content.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: &'static str,
    pub context: String,
    pub strength: ModelStrength,
    pub temperature: f32,
    /// Short label used for logs and prompt dumps ("edits", "plan", ...).
    pub stage: &'static str,
}

/// "Given a prompt and context, return generated text."
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        request: GenerationRequest,
    ) -> impl Future<Output = CoderResult<String>> + Send;
}

impl TextGenerator for LlmServiceProfiles {
    async fn generate(&self, request: GenerationRequest) -> CoderResult<String> {
        let t0 = Instant::now();
        let res = LlmServiceProfiles::generate(
            self,
            request.strength,
            request.prompt,
            &request.context,
            Some(request.temperature),
        )
        .await;

        match res {
            Ok(text) => {
                debug!(
                    stage = request.stage,
                    strength = ?request.strength,
                    context_len = request.context.len(),
                    response_len = text.len(),
                    latency_ms = t0.elapsed().as_millis() as u64,
                    "generation ok"
                );
                prompt_dump::dump_exchange(request.stage, request.prompt, &request.context, &text);
                Ok(text)
            }
            Err(e) => {
                warn!(stage = request.stage, error = %e, "generation failed");
                Err(e.into())
            }
        }
    }
}
