//! Line tokenizer for the search/replace wire grammar.
//!
//! A block is exactly eight structural parts, each starting on its own line:
//!
//! ~~~text
//! path/to/file.rs
//! ```rust
//! <<<<<<< SEARCH
//! ...search lines...
//! =======
//! ...replace lines...
//! >>>>>>> REPLACE
//! ```
//! ~~~
//!
//! Markers must match exactly (only the line terminator is stripped, `\n` or
//! `\r\n`). The fence lines only need to start with three backticks, so any
//! language tag is accepted. Search and replace bodies keep their line
//! terminators verbatim, blank lines included. When a candidate block breaks
//! off partway, scanning resumes at the line after its path line, so matches
//! never overlap and keep response order.

use super::{EditBlock, EditSet};

pub const SEARCH_MARKER: &str = "<<<<<<< SEARCH";
pub const DIVIDER_MARKER: &str = "=======";
pub const REPLACE_MARKER: &str = ">>>>>>> REPLACE";
const FENCE: &str = "```";

/// A physical line: byte offset of its start and its raw text (terminator included).
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    offset: usize,
    raw: &'a str,
}

impl<'a> Line<'a> {
    /// Line text without `\n` / `\r\n`.
    fn body(&self) -> &'a str {
        let s = self.raw.strip_suffix('\n').unwrap_or(self.raw);
        s.strip_suffix('\r').unwrap_or(s)
    }
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    let mut offset = 0;
    text.split_inclusive('\n')
        .map(|raw| {
            let line = Line { offset, raw };
            offset += raw.len();
            line
        })
        .collect()
}

/// Tries to match one block whose path line is `lines[start]`.
/// Returns the block and the index of the first line after its closing fence.
fn match_block(lines: &[Line<'_>], start: usize) -> Option<(EditBlock, usize)> {
    let filename = lines.get(start)?.body().trim();
    if filename.is_empty() || filename.starts_with(FENCE) {
        return None;
    }
    if !lines.get(start + 1)?.body().starts_with(FENCE) {
        return None;
    }
    if lines.get(start + 2)?.body() != SEARCH_MARKER {
        return None;
    }

    let mut i = start + 3;
    let mut search = String::new();
    loop {
        let line = lines.get(i)?;
        if line.body() == DIVIDER_MARKER {
            break;
        }
        search.push_str(line.raw);
        i += 1;
    }

    i += 1;
    let mut replace = String::new();
    loop {
        let line = lines.get(i)?;
        if line.body() == REPLACE_MARKER {
            break;
        }
        replace.push_str(line.raw);
        i += 1;
    }

    if !lines.get(i + 1)?.body().starts_with(FENCE) {
        return None;
    }

    Some((
        EditBlock {
            filename: filename.to_string(),
            search,
            replace,
        },
        i + 2,
    ))
}

/// Finds every well-formed block, in order. Also returns the byte offset of
/// the first block's path line (`None` when there are no blocks).
fn scan(text: &str) -> (Vec<EditBlock>, Option<usize>) {
    let lines = split_lines(text);
    let mut blocks = Vec::new();
    let mut first_offset = None;
    let mut i = 0;

    while i < lines.len() {
        match match_block(&lines, i) {
            Some((block, next)) => {
                first_offset.get_or_insert(lines[i].offset);
                blocks.push(block);
                i = next;
            }
            None => i += 1,
        }
    }
    (blocks, first_offset)
}

/// Cleans the free text preceding the first block: trims it and drops an
/// optional leading `EXPLANATION:` label and trailing `CHANGES:` label.
fn clean_explanation(raw: &str) -> String {
    let s = raw.trim();
    let s = s.strip_prefix("EXPLANATION:").unwrap_or(s).trim();
    let s = s.strip_suffix("CHANGES:").unwrap_or(s).trim();
    s.to_string()
}

/// Parses a generator response into blocks plus explanation.
///
/// The explanation is everything before the first matched block; with no
/// blocks it is the whole (cleaned) response.
pub fn parse_response(text: &str) -> EditSet {
    let (blocks, first_offset) = scan(text);
    let head = match first_offset {
        Some(off) => &text[..off],
        None => text,
    };
    EditSet {
        blocks,
        explanation: clean_explanation(head),
    }
}
