//! File directives embedded in request text.
//!
//! Two spellings are accepted for each list:
//!
//! ```text
//! /add src/lib.rs docs/          /ignore target/ *.lock
//!
//! .add-files                     .ignore
//! - src/lib.rs                   - target/
//! - docs/                        - *.lock
//! ```
//!
//! Single-line directives must start their line and may repeat; every
//! occurrence of either spelling contributes to the result.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDirectives {
    pub add: Vec<String>,
    pub ignore: Vec<String>,
}

impl FileDirectives {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.ignore.is_empty()
    }
}

struct DirectiveRes {
    inline_add: Regex,
    inline_ignore: Regex,
    legacy_add: Regex,
    legacy_ignore: Regex,
    bullet: Regex,
}

fn res() -> &'static DirectiveRes {
    static RES: OnceLock<DirectiveRes> = OnceLock::new();
    RES.get_or_init(|| DirectiveRes {
        inline_add: Regex::new(r"(?m)^[ \t]*/add[ \t]+([^\n]+)$").expect("inline add regex"),
        inline_ignore: Regex::new(r"(?m)^[ \t]*/ignore[ \t]+([^\n]+)$")
            .expect("inline ignore regex"),
        legacy_add: Regex::new(r"\.add-files\s+((?:-[ \t]+[^\n]+\s*)+)").expect("legacy add regex"),
        legacy_ignore: Regex::new(r"\.ignore\s+((?:-[ \t]+[^\n]+\s*)+)")
            .expect("legacy ignore regex"),
        bullet: Regex::new(r"(?m)^[ \t]*-[ \t]+([^\n]+)").expect("bullet regex"),
    })
}

fn push_unique(out: &mut Vec<String>, item: &str) {
    let item = item.trim().trim_end_matches('\r');
    if !item.is_empty() && !out.iter().any(|x| x == item) {
        out.push(item.to_string());
    }
}

fn collect(text: &str, inline: &Regex, legacy: &Regex, bullet: &Regex) -> Vec<String> {
    let mut out = Vec::new();
    for caps in legacy.captures_iter(text) {
        if let Some(list) = caps.get(1) {
            for item in bullet.captures_iter(list.as_str()) {
                if let Some(m) = item.get(1) {
                    push_unique(&mut out, m.as_str());
                }
            }
        }
    }
    for caps in inline.captures_iter(text) {
        if let Some(list) = caps.get(1) {
            for item in list.as_str().split_whitespace() {
                push_unique(&mut out, item);
            }
        }
    }
    out
}

/// Extracts the add/ignore lists from `text`, in first-seen order, deduplicated.
pub fn extract_directives(text: &str) -> FileDirectives {
    let r = res();
    FileDirectives {
        add: collect(text, &r.inline_add, &r.legacy_add, &r.bullet),
        ignore: collect(text, &r.inline_ignore, &r.legacy_ignore, &r.bullet),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_directives_accumulate() {
        let text = "@github-ai-bot please fix\n/add src/a.rs src/b/\n/ignore src/b/gen.rs\n/add README.md";
        let d = extract_directives(text);
        assert_eq!(d.add, ["src/a.rs", "src/b/", "README.md"]);
        assert_eq!(d.ignore, ["src/b/gen.rs"]);
    }

    #[test]
    fn legacy_bullet_lists() {
        let text = "Please update.\n.add-files\n- src/*.rs\n- docs/\n\n.ignore\n- docs/old/\n";
        let d = extract_directives(text);
        assert_eq!(d.add, ["src/*.rs", "docs/"]);
        assert_eq!(d.ignore, ["docs/old/"]);
    }

    #[test]
    fn mixed_forms_are_deduplicated() {
        let text = ".add-files\n- a.rs\n/add a.rs b.rs";
        assert_eq!(extract_directives(text).add, ["a.rs", "b.rs"]);
    }

    #[test]
    fn mid_line_slash_add_is_not_a_directive() {
        let d = extract_directives("see https://host/add this please");
        assert!(d.is_empty());
    }

    #[test]
    fn no_directives() {
        assert!(extract_directives("just change the color").is_empty());
    }
}
