//! Commit subject from the model's explanation (best effort, never fails).

use tracing::{info, warn};

use crate::generator::{GenerationRequest, ModelStrength, TextGenerator};
use crate::prompts;

pub const FALLBACK_SUBJECT: &str = "Code changes requested";

fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect::<String>().trim_end().to_string()
}

/// First non-empty line, surrounding quotes removed, cut to `limit` characters.
fn subject_line(text: &str, limit: usize) -> Option<String> {
    text.lines()
        .map(|l| l.trim().trim_matches('"').trim())
        .find(|l| !l.is_empty())
        .map(|l| truncate_chars(l, limit))
}

/// Condenses `explanation` into one line of at most `limit` characters.
///
/// Empty explanation: [`FALLBACK_SUBJECT`], no generator call. Generator
/// failure: the explanation's first line, cut to `limit` characters.
pub async fn summarize<G: TextGenerator>(
    generator: &G,
    explanation: &str,
    limit: usize,
) -> String {
    if explanation.trim().is_empty() {
        return FALLBACK_SUBJECT.to_string();
    }

    let res = generator
        .generate(GenerationRequest {
            prompt: prompts::COMMIT_MESSAGE,
            context: format!("Technical explanation: {explanation}"),
            strength: ModelStrength::Weak,
            temperature: 0.7,
            stage: "summary",
        })
        .await;

    let fallback =
        || subject_line(explanation, limit).unwrap_or_else(|| FALLBACK_SUBJECT.to_string());
    match res {
        Ok(text) => match subject_line(&text, limit) {
            Some(subject) => {
                info!(subject = %subject, "commit subject generated");
                subject
            }
            None => {
                warn!("commit subject generation returned empty text");
                fallback()
            }
        },
        Err(e) => {
            warn!(error = %e, "commit subject generation failed; using explanation");
            fallback()
        }
    }
}
