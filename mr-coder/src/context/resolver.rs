//! Turns a request into the set of files the generator gets to see.
//!
//! baseline ∪ expand(add) − ignore, as root-relative `/`-separated paths.
//! Wildcards never match dotfiles, and nothing under `.git/` is ever returned.

use std::collections::BTreeSet;
use std::path::{Component, Path};

use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};

use super::directives::extract_directives;
use crate::paths::is_within;

const MATCH_OPTS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

const GIT_DIR: &str = ".git";

fn is_git_internal(path: &str) -> bool {
    path.split('/').next() == Some(GIT_DIR)
}

/// `dir/` means "every file under dir".
fn normalize_pattern(pattern: &str) -> String {
    let p = pattern.trim_start_matches("./");
    if p.ends_with('/') {
        format!("{p}**/*")
    } else {
        p.to_string()
    }
}

fn escapes_root(pattern: &str) -> bool {
    let p = Path::new(pattern);
    p.is_absolute()
        || p
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
}

/// Root-relative path with `/` separators.
fn to_rel(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Expands glob patterns against `root`, files only.
///
/// A pattern that fails to parse or escapes the root is logged and skipped.
pub fn expand_globs(root: &Path, patterns: &[String]) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    let root_escaped = Pattern::escape(&root.to_string_lossy());

    for pattern in patterns {
        if escapes_root(pattern) {
            warn!(%pattern, "glob pattern leaves the working tree; skipped");
            continue;
        }
        let full = format!("{}/{}", root_escaped, normalize_pattern(pattern));
        let paths = match glob::glob_with(&full, MATCH_OPTS) {
            Ok(paths) => paths,
            Err(e) => {
                warn!(%pattern, error = %e, "invalid glob pattern; skipped");
                continue;
            }
        };
        let before = out.len();
        for entry in paths {
            match entry {
                Ok(p) if p.is_file() => {
                    if !is_within(root, &p) {
                        warn!(path = %p.display(), "glob match leaves the working tree; skipped");
                        continue;
                    }
                    if let Some(rel) = to_rel(root, &p) {
                        out.insert(rel);
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(%pattern, error = %e, "unreadable path while globbing"),
            }
        }
        debug!(%pattern, matched = out.len() - before, "glob expanded");
    }
    out
}

/// `true` when `path` matches an ignore glob or lies under an ignored directory.
fn is_ignored(path: &str, ignore: &[(String, Option<Pattern>)]) -> bool {
    ignore.iter().any(|(raw, pat)| {
        let raw = raw.trim_start_matches("./");
        (raw.ends_with('/') && path.starts_with(raw))
            || pat.as_ref().is_some_and(|p| p.matches_with(path, MATCH_OPTS))
    })
}

/// Resolves the request's file set: baseline plus `add` directives, minus
/// `ignore` directives. The result is sorted, so identical inputs always
/// produce identical output.
pub fn resolve_paths(root: &Path, request_text: &str, baseline: &[String]) -> Vec<String> {
    let directives = extract_directives(request_text);

    let mut all: BTreeSet<String> = baseline
        .iter()
        .map(|p| p.trim_start_matches("./").to_string())
        .filter(|p| !p.is_empty())
        .collect();
    all.extend(expand_globs(root, &directives.add));

    let ignore: Vec<(String, Option<Pattern>)> = directives
        .ignore
        .iter()
        .map(|raw| {
            let pat = match Pattern::new(&normalize_pattern(raw)) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!(pattern = %raw, error = %e, "invalid ignore pattern; skipped");
                    None
                }
            };
            (raw.clone(), pat)
        })
        .collect();

    let resolved: Vec<String> = all
        .into_iter()
        .filter(|p| !is_git_internal(p) && !is_ignored(p, &ignore))
        .collect();
    debug!(
        baseline = baseline.len(),
        add = directives.add.len(),
        ignore = directives.ignore.len(),
        resolved = resolved.len(),
        "paths resolved"
    );
    resolved
}
