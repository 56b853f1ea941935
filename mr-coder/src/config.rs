//! Process-wide bot settings, read once at startup and passed by value.

use ai_llm_service::error_handler::{env_opt, env_opt_u32};

use crate::errors::{CoderResult, Error};

pub const DEFAULT_TRIGGER_PHRASE: &str = "@github-ai-bot";
pub const DEFAULT_PATCH_MAX_ROUNDS: usize = 3;
pub const DEFAULT_COMMIT_SUBJECT_LIMIT: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoderConfig {
    /// Phrase a comment must contain to address the bot.
    pub trigger_phrase: String,
    /// Maximum number of patch-application rounds (first attempt included).
    pub patch_max_rounds: usize,
    /// Maximum commit subject length, in characters.
    pub commit_subject_limit: usize,
}

impl Default for CoderConfig {
    fn default() -> Self {
        Self {
            trigger_phrase: DEFAULT_TRIGGER_PHRASE.to_string(),
            patch_max_rounds: DEFAULT_PATCH_MAX_ROUNDS,
            commit_subject_limit: DEFAULT_COMMIT_SUBJECT_LIMIT,
        }
    }
}

impl CoderConfig {
    /// Reads `TRIGGER_PHRASE`, `PATCH_MAX_ROUNDS` and `COMMIT_SUBJECT_LIMIT`.
    pub fn from_env() -> CoderResult<Self> {
        let def = Self::default();
        let cfg = Self {
            trigger_phrase: env_opt("TRIGGER_PHRASE").unwrap_or(def.trigger_phrase),
            patch_max_rounds: env_opt_u32("PATCH_MAX_ROUNDS")
                .map_err(|e| Error::Config(e.to_string()))?
                .map(|v| v as usize)
                .unwrap_or(def.patch_max_rounds),
            commit_subject_limit: env_opt_u32("COMMIT_SUBJECT_LIMIT")
                .map_err(|e| Error::Config(e.to_string()))?
                .map(|v| v as usize)
                .unwrap_or(def.commit_subject_limit),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> CoderResult<()> {
        if self.trigger_phrase.trim().is_empty() {
            return Err(Error::Config("TRIGGER_PHRASE must not be empty".into()));
        }
        if self.patch_max_rounds == 0 {
            return Err(Error::Config("PATCH_MAX_ROUNDS must be at least 1".into()));
        }
        if self.commit_subject_limit == 0 {
            return Err(Error::Config("COMMIT_SUBJECT_LIMIT must be at least 1".into()));
        }
        Ok(())
    }
}
