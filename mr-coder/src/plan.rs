//! Plan generation: one strong-model call, memoized on the request context.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use crate::context::RequestContext;
use crate::errors::CoderResult;
use crate::generator::{GenerationRequest, ModelStrength, TextGenerator};
use crate::prompts;

fn plan_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)PLAN:\s*(.*?)(?:\s*ENDPLAN|\s*\z)").expect("plan regex"))
}

/// Text between `PLAN:` and `ENDPLAN` (or end of text); the whole trimmed
/// response when the marker is missing.
pub fn extract_plan(response: &str) -> String {
    plan_re()
        .captures(response)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| response.trim())
        .to_string()
}

/// Returns the context's plan, generating it on first call.
pub async fn ensure_plan<G: TextGenerator>(
    generator: &G,
    ctx: &mut RequestContext,
) -> CoderResult<String> {
    if let Some(plan) = ctx.plan() {
        debug!("plan already generated");
        return Ok(plan.to_string());
    }

    let response = generator
        .generate(GenerationRequest {
            prompt: prompts::CODE_PLANNING,
            context: ctx.render(),
            strength: ModelStrength::Strong,
            temperature: 0.2,
            stage: "plan",
        })
        .await?;

    let plan = extract_plan(&response);
    info!(plan_len = plan.len(), "plan generated");
    ctx.set_plan(plan.clone());
    Ok(plan)
}
