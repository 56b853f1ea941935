//! Edit-set generation: one generator round-trip parsed into search/replace
//! blocks plus a free-text explanation.

pub mod grammar;

use tracing::{debug, info, warn};

use crate::context::RequestContext;
use crate::errors::{CoderResult, Error};
use crate::generator::{GenerationRequest, ModelStrength, TextGenerator};
use crate::prompts;

pub use grammar::parse_response;

/// One file edit. An empty (whitespace-only) `search` creates `filename`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBlock {
    pub filename: String,
    pub search: String,
    pub replace: String,
}

impl EditBlock {
    pub fn is_creation(&self) -> bool {
        self.search.trim().is_empty()
    }
}

/// Blocks of one generation round plus the model's explanation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSet {
    pub blocks: Vec<EditBlock>,
    pub explanation: String,
}

impl EditSet {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Asks the strong model for an edit set over the current context.
///
/// A response without a single well-formed block is [`Error::NoEditsProduced`].
pub async fn request_edit_set<G: TextGenerator>(
    generator: &G,
    ctx: &RequestContext,
) -> CoderResult<EditSet> {
    let context = ctx.render();
    debug!(context_len = context.len(), "requesting edit set");

    let response = generator
        .generate(GenerationRequest {
            prompt: prompts::CODE_MODIFICATION,
            context,
            strength: ModelStrength::Strong,
            temperature: 0.2,
            stage: "edits",
        })
        .await?;

    let set = parse_response(&response);
    if set.is_empty() {
        warn!(response_len = response.len(), "no search/replace blocks in response");
        return Err(Error::NoEditsProduced);
    }
    info!(
        blocks = set.blocks.len(),
        explanation_len = set.explanation.len(),
        "edit set parsed"
    );
    Ok(set)
}
