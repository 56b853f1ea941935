//! AI code modification for GitHub: request context, the search/replace
//! edit protocol, patch application with bounded retries, and the bot
//! commands built on top.
//!
//! The core talks to its collaborators through three capabilities:
//! [`TextGenerator`], [`SourceHost`] and [`VersionControl`].

pub mod commands;
pub mod config;
pub mod context;
pub mod edits;
pub mod errors;
pub mod generator;
pub mod host;
pub mod orchestrator;
pub mod patch;
pub mod paths;
pub mod plan;
pub mod prompts;
pub mod summary;
pub mod telemetry;
pub mod vcs;

#[cfg(test)]
mod testing;

pub use commands::{BotEvent, GitHubBot};
pub use config::CoderConfig;
pub use context::{ArtifactMeta, RequestContext};
pub use edits::{EditBlock, EditSet, parse_response};
pub use errors::{ApplyFailure, CoderResult, Error};
pub use generator::{GenerationRequest, TextGenerator};
pub use host::SourceHost;
pub use orchestrator::{ModifyOutcome, ModifyRequest, Orchestrator};
pub use patch::{ApplyResult, PatchEngine};
pub use vcs::VersionControl;
