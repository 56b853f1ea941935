//! GitHub access layer: issues, pull requests, comments and repository facts.

pub mod errors;
pub mod git_providers;

pub use errors::{GitContextEngineError, GitContextEngineResult};
pub use git_providers::{GitHubClient, ProviderConfig};
