//! Patch engine: applies edit blocks to the working root and, while blocks
//! fail, asks the generator for corrected ones with a report of the failures.
//!
//! Round `r` applies its blocks in order. Filenames of every round are
//! accumulated as changed files, including blocks that failed. A round with
//! no failures ends the run; after `max_rounds` rounds the remaining failures
//! are returned as [`Error::RetryBudgetExhausted`].

pub mod apply;

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::context::RequestContext;
use crate::edits::{EditBlock, request_edit_set};
use crate::errors::{ApplyFailure, CoderResult, Error};
use crate::generator::TextGenerator;

pub use apply::{apply_block, apply_round};

/// A block that could not be applied, with the reason.
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub block: EditBlock,
    pub error: ApplyFailure,
}

/// Outcome of one application round.
#[derive(Debug, Default)]
pub struct RoundResult {
    /// Filenames of every block in the round, in order.
    pub touched: Vec<String>,
    pub succeeded: Vec<EditBlock>,
    pub failed: Vec<FailureRecord>,
}

impl RoundResult {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Successful engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub changed_files: BTreeSet<String>,
    pub rounds: usize,
}

impl ApplyResult {
    pub fn changed_files(&self) -> Vec<String> {
        self.changed_files.iter().cloned().collect()
    }
}

const REPORT_HEADER: &str = "The following search/replace blocks failed to apply. Please provide corrected versions for these blocks:\n\n";
const REPORT_FOOTER: &str = "Please provide corrected search/replace blocks for these files.";

/// Follow-up text describing every failed block of a round.
pub fn follow_up_report(failures: &[FailureRecord]) -> String {
    let entries = failures
        .iter()
        .map(|f| {
            format!(
                "File: {}\nError: {}\nOriginal search:\n```\n{}\n```\nOriginal replace:\n```\n{}\n```\n",
                f.block.filename, f.error, f.block.search, f.block.replace
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("{REPORT_HEADER}{entries}{REPORT_FOOTER}")
}

#[derive(Debug, Clone, Copy)]
pub struct PatchEngine {
    max_rounds: usize,
}

impl PatchEngine {
    /// `max_rounds` is clamped to at least one.
    pub fn new(max_rounds: usize) -> Self {
        Self {
            max_rounds: max_rounds.max(1),
        }
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// Applies `initial` and retries failures until they converge or the
    /// round budget is spent. Each retry appends the failure report to
    /// `ctx` and replaces the block list with the generator's answer.
    pub async fn run<G: TextGenerator>(
        &self,
        generator: &G,
        ctx: &mut RequestContext,
        initial: Vec<EditBlock>,
    ) -> CoderResult<ApplyResult> {
        let mut blocks = initial;
        let mut changed = BTreeSet::new();
        let mut round = 0;

        loop {
            round += 1;
            let result = apply_round(ctx.root(), &blocks);
            changed.extend(result.touched.iter().cloned());
            info!(
                round,
                applied = result.succeeded.len(),
                failed = result.failed.len(),
                "patch round finished"
            );

            if result.is_success() {
                return Ok(ApplyResult {
                    changed_files: changed,
                    rounds: round,
                });
            }

            if round >= self.max_rounds {
                warn!(
                    rounds = round,
                    unresolved = result.failed.len(),
                    "patch retry budget exhausted"
                );
                return Err(Error::RetryBudgetExhausted {
                    unresolved: result.failed,
                    rounds: round,
                });
            }

            ctx.append_follow_up(follow_up_report(&result.failed));
            blocks = request_edit_set(generator, ctx).await?.blocks;
        }
    }
}
