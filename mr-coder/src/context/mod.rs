//! Request context: everything the generator is told about one request.
//!
//! Sections are rendered in a fixed order:
//! 1. prior-artifact title/description (when it differs from the request)
//! 2. comment thread
//! 3. `Request: ...`
//! 4. plan (once generated)
//! 5. `Available files and contents:` with every resolved file, read from disk
//!    on each render
//! 6. unified diff
//! 7. anchored review comment as JSON
//!
//! followed by every follow-up as `Additional context:`.

pub mod directives;
pub mod resolver;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use git_context_engine::git_providers::{IssueComment, ReviewComment};
use serde::Serialize;
use tracing::{debug, warn};

use crate::paths::resolve_in_root;

/// A review comment anchored to a diff line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewAnchor {
    pub path: String,
    pub line: Option<u32>,
    pub diff_hunk: String,
    pub position: Option<u32>,
    pub commit_id: String,
}

impl From<&ReviewComment> for ReviewAnchor {
    fn from(c: &ReviewComment) -> Self {
        Self {
            path: c.path.clone(),
            line: c.line,
            diff_hunk: c.diff_hunk.clone(),
            position: c.position,
            commit_id: c.commit_id.clone(),
        }
    }
}

/// Metadata of the issue / PR the request was made on.
#[derive(Debug, Clone, Default)]
pub struct ArtifactMeta {
    pub title: Option<String>,
    pub body: Option<String>,
    pub comments: Vec<IssueComment>,
    pub diff: Option<String>,
    pub review_anchor: Option<ReviewAnchor>,
}

#[derive(Debug)]
pub struct RequestContext {
    request_text: String,
    artifact: ArtifactMeta,
    root: PathBuf,
    baseline: Vec<String>,
    resolved: OnceLock<Vec<String>>,
    plan: Option<String>,
    follow_ups: Vec<String>,
}

impl RequestContext {
    pub fn new(
        request_text: impl Into<String>,
        artifact: ArtifactMeta,
        root: impl Into<PathBuf>,
        baseline: Vec<String>,
    ) -> Self {
        Self {
            request_text: request_text.into(),
            artifact,
            root: root.into(),
            baseline,
            resolved: OnceLock::new(),
            plan: None,
            follow_ups: Vec::new(),
        }
    }

    pub fn request_text(&self) -> &str {
        &self.request_text
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolved file list; computed on first use and cached for the run.
    pub fn resolved_paths(&self) -> &[String] {
        self.resolved.get_or_init(|| {
            resolver::resolve_paths(&self.root, &self.request_text, &self.baseline)
        })
    }

    pub fn plan(&self) -> Option<&str> {
        self.plan.as_deref()
    }

    pub fn set_plan(&mut self, plan: String) {
        self.plan = Some(plan);
    }

    /// Appends text that every later render carries after the base sections.
    pub fn append_follow_up(&mut self, text: impl Into<String>) {
        self.follow_ups.push(text.into());
    }

    pub fn follow_ups(&self) -> &[String] {
        &self.follow_ups
    }

    /// Current contents of every resolved file; unreadable files get an
    /// error marker instead of failing the render.
    pub fn file_contents(&self) -> Vec<(String, String)> {
        self.resolved_paths()
            .iter()
            .map(|path| {
                let Some(full) = resolve_in_root(&self.root, path) else {
                    warn!(file = %path, "file lies outside the working tree; not read");
                    let marker = "[Error reading file: outside the working tree]";
                    return (path.clone(), marker.to_string());
                };
                let content = match fs::read_to_string(full) {
                    Ok(c) => c,
                    Err(e) => {
                        warn!(file = %path, error = %e, "could not read file for context");
                        format!("[Error reading file: {e}]")
                    }
                };
                (path.clone(), content)
            })
            .collect()
    }

    fn artifact_section(&self) -> Option<String> {
        let title = self.artifact.title.as_deref().map(str::trim).unwrap_or("");
        let body = self.artifact.body.as_deref().map(str::trim).unwrap_or("");
        if title.is_empty() && body.is_empty() {
            return None;
        }
        let request = self.request_text.trim();
        if body == request || format!("{title}\n\n{body}").trim() == request {
            return None;
        }
        let mut s = String::new();
        if !title.is_empty() {
            s.push_str(&format!("Title: {title}\n"));
        }
        if !body.is_empty() {
            s.push_str(&format!("Description:\n{body}\n"));
        }
        Some(s.trim_end().to_string())
    }

    fn comments_section(&self) -> Option<String> {
        if self.artifact.comments.is_empty() {
            return None;
        }
        let thread = self
            .artifact
            .comments
            .iter()
            .map(|c| format!("{}: {}", c.author, c.body.trim()))
            .collect::<Vec<_>>()
            .join("\n\n");
        Some(format!("Comments:\n{thread}"))
    }

    fn files_section(&self) -> String {
        let listing = self
            .file_contents()
            .into_iter()
            .map(|(path, content)| format!("--- {path} ---\n{content}\n"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Available files and contents:\n{listing}")
    }

    fn anchor_section(&self) -> Option<String> {
        let anchor = self.artifact.review_anchor.as_ref()?;
        match serde_json::to_string_pretty(anchor) {
            Ok(json) => Some(format!("Review comment:\n{json}")),
            Err(e) => {
                warn!(error = %e, "could not serialize review anchor");
                None
            }
        }
    }

    /// Renders the full text sent to the generator.
    pub fn render(&self) -> String {
        let mut sections: Vec<String> = Vec::with_capacity(7);
        sections.extend(self.artifact_section());
        sections.extend(self.comments_section());
        sections.push(format!("Request: {}", self.request_text));
        if let Some(plan) = self.plan() {
            sections.push(format!("Plan:\n{plan}"));
        }
        sections.push(self.files_section());
        if let Some(diff) = self.artifact.diff.as_deref().filter(|d| !d.trim().is_empty()) {
            sections.push(format!("Diff:\n```diff\n{}\n```", diff.trim_end()));
        }
        sections.extend(self.anchor_section());

        let mut out = sections.join("\n\n");
        for follow_up in &self.follow_ups {
            out.push_str("\n\nAdditional context:\n");
            out.push_str(follow_up);
        }
        debug!(
            len = out.len(),
            files = self.resolved_paths().len(),
            follow_ups = self.follow_ups.len(),
            "context rendered"
        );
        out
    }
}
