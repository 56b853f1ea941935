//! One application round: every block, in order, against the working root.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{FailureRecord, RoundResult};
use crate::edits::EditBlock;
use crate::errors::ApplyFailure;
use crate::paths::resolve_in_root;

/// Joins a block filename onto `root`, refusing anything that could leave it,
/// through `..` or through a symlink.
fn target_path(root: &Path, filename: &str) -> Result<PathBuf, ApplyFailure> {
    resolve_in_root(root, filename).ok_or_else(|| ApplyFailure::InvalidPath(filename.to_string()))
}

fn io_failure(filename: &str, e: std::io::Error) -> ApplyFailure {
    ApplyFailure::Io {
        path: filename.to_string(),
        reason: e.to_string(),
    }
}

/// Applies one block.
///
/// - whitespace-only `search`: write `replace` as the whole file (parents created)
/// - otherwise: replace the first exact occurrence of `search`
pub fn apply_block(root: &Path, block: &EditBlock) -> Result<(), ApplyFailure> {
    let path = target_path(root, &block.filename)?;

    if block.is_creation() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_failure(&block.filename, e))?;
        }
        fs::write(&path, &block.replace).map_err(|e| io_failure(&block.filename, e))?;
        debug!(file = %block.filename, bytes = block.replace.len(), "file written");
        return Ok(());
    }

    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ApplyFailure::FileNotFound(block.filename.clone()));
        }
        Err(e) => return Err(io_failure(&block.filename, e)),
    };

    if !content.contains(&block.search) {
        return Err(ApplyFailure::SearchTextNotFound(block.filename.clone()));
    }

    let updated = content.replacen(&block.search, &block.replace, 1);
    fs::write(&path, updated).map_err(|e| io_failure(&block.filename, e))?;
    debug!(file = %block.filename, "block applied");
    Ok(())
}

/// Runs one round. Every filename counts as touched, whether or not its
/// block applied.
pub fn apply_round(root: &Path, blocks: &[EditBlock]) -> RoundResult {
    let mut result = RoundResult::default();
    for block in blocks {
        result.touched.push(block.filename.clone());
        match apply_block(root, block) {
            Ok(()) => result.succeeded.push(block.clone()),
            Err(error) => {
                warn!(file = %block.filename, error = %error, "error applying block");
                result.failed.push(FailureRecord {
                    block: block.clone(),
                    error,
                });
            }
        }
    }
    result
}
