//! Prompt telemetry: safe dumping of every generator round-trip.
//!
//! ## What it does
//! - Dumps system prompt, context and response to
//!   `code_data/prompts/<run>/<stage>/NNN.txt`.
//! - Emits a concise DEBUG log line (stage, file path, lengths).
//! - Optionally **redacts secrets** (GitHub tokens, Bearer tokens, token URLs).
//! - Supports truncation for huge contexts (configurable via env).
//!
//! ## Env flags
//! - `MR_CODER_LOG_PROMPTS` (bool): enable dumping (default: false)
//! - `MR_CODER_PROMPT_REDACT` (bool): redact secrets (default: true)
//! - `MR_CODER_PROMPT_MAX_CHARS` (usize): 0 = no truncation (default: 0)

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use regex::Regex;
use services::redact::mask_credentials;
use tracing::debug;

/// Returns `true` if the given env var is set to a truthy value ("1", "true", "yes", "on").
fn env_flag(name: &str) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => false,
    }
}

fn env_usize(name: &str, default_: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default_)
}

/// One directory per process run, named by start time.
fn run_id() -> &'static str {
    static RUN: OnceLock<String> = OnceLock::new();
    RUN.get_or_init(|| chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string())
}

fn dump_dir(stage: &str) -> PathBuf {
    Path::new("code_data")
        .join("prompts")
        .join(run_id())
        .join(stage)
}

fn secret_patterns() -> &'static [Regex] {
    static PATS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATS.get_or_init(|| {
        [
            r"\bgh[pousr]_[A-Za-z0-9]{20,}",
            r"\bgithub_pat_[A-Za-z0-9_]{20,}",
            r"(?i)\bBearer\s+[A-Za-z0-9\-_\.=]{16,}",
            r"(?i)\bsk-[A-Za-z0-9\-_]{16,}",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Redact obvious secrets (best-effort; keep it conservative). URL userinfo
/// goes through the same masking as every outgoing message.
fn redact_secrets(s: String) -> String {
    let mut s = mask_credentials(&s);
    for re in secret_patterns() {
        s = re.replace_all(&s, "[REDACTED]").into_owned();
    }
    s
}

/// Optionally truncate to at most `max_chars`, keeping a suffix note.
fn maybe_truncate(s: String, max_chars: usize) -> (String, bool) {
    if max_chars == 0 || s.chars().count() <= max_chars {
        return (s, false);
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push_str("\n\n[... TRUNCATED ...]\n");
    (out, true)
}

/// Writes one generator exchange to disk when `MR_CODER_LOG_PROMPTS` is on.
///
/// Never fails: write errors are logged at DEBUG and ignored.
pub fn dump_exchange(stage: &str, system: &str, context: &str, response: &str) {
    if !env_flag("MR_CODER_LOG_PROMPTS") {
        return;
    }

    static SEQ: AtomicUsize = AtomicUsize::new(0);
    let idx = SEQ.fetch_add(1, Ordering::Relaxed);

    let redact =
        env_flag("MR_CODER_PROMPT_REDACT") || std::env::var("MR_CODER_PROMPT_REDACT").is_err();
    let max_chars = env_usize("MR_CODER_PROMPT_MAX_CHARS", 0);

    let mut content = format!(
        "### SYSTEM\n{system}\n\n### CONTEXT\n{context}\n\n### RESPONSE\n{response}\n"
    );
    if redact {
        content = redact_secrets(content);
    }
    let (content, truncated) = maybe_truncate(content, max_chars);

    let dir = dump_dir(stage);
    let file = dir.join(format!("{idx:03}.txt"));
    if let Err(e) = fs::create_dir_all(&dir).and_then(|_| fs::write(&file, &content)) {
        debug!(error = %e, file = %file.display(), "prompt dump skipped");
        return;
    }

    debug!(
        stage,
        idx,
        file = %file.display(),
        len = content.chars().count(),
        truncated,
        "prompt dumped"
    );
}
