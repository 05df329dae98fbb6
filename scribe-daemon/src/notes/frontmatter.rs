//! Parse markdown notes into their dispatchable parts.
//!
//! Hand-rolled YAML frontmatter (no serde_yaml) - flat `key: value` scalars
//! and inline `[a, b]` lists only; nested blocks are skipped, never an error.
//! Checkbox tasks and inline #tags are extracted from the body via regex.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// A single `- [ ]` / `- [x]` task line from a note body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckboxTask {
    /// The task description with surrounding whitespace trimmed.
    pub task: String,
    /// `true` for a lowercase `x` marker. Any other marker character does
    /// not parse as a checkbox at all.
    pub checked: bool,
    /// The trimmed source line; this is what gets fingerprinted.
    pub raw_line: String,
}

/// A scalar frontmatter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterValue {
    Bool(bool),
    String(String),
    List(Vec<String>),
}

/// Flat frontmatter mapping. The dispatcher only ever queries the `secure`
/// boolean, but the full mapping is kept for logging and the parse_test bin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    values: BTreeMap<String, FrontmatterValue>,
}

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.values.get(key)
    }

    /// True only when the key holds the YAML boolean `true`. A quoted
    /// `"true"` is a string and does not count.
    pub fn get_bool(&self, key: &str) -> bool {
        matches!(self.values.get(key), Some(FrontmatterValue::Bool(true)))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FrontmatterValue)> {
        self.values.iter()
    }
}

/// A fully parsed note (frontmatter + body + extracted directives).
#[derive(Debug, Clone)]
pub struct ParsedNote {
    pub frontmatter: Frontmatter,
    pub body: String,
    /// Checkbox tasks in document order.
    pub checkboxes: Vec<CheckboxTask>,
    /// Deduplicated inline #tags from the body (frontmatter excluded).
    pub tags: BTreeSet<String>,
}

static CHECKBOX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s*\[(x| )\]\s*(.*)$").unwrap());
static INLINE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#([\w-]+)").unwrap());

/// Parse a complete note. Never fails: malformed frontmatter degrades to an
/// empty mapping with the whole input treated as body.
pub fn parse_note(content: &str) -> ParsedNote {
    let (yaml, body) = split_frontmatter(content);
    let frontmatter = parse_frontmatter(&yaml);
    let checkboxes = extract_checkboxes(&body);
    let tags = extract_inline_tags(&body);

    ParsedNote {
        frontmatter,
        body,
        checkboxes,
        tags,
    }
}

/// Split content into (frontmatter_yaml, body). Returns empty frontmatter
/// when no properly fenced block is found.
fn split_frontmatter(content: &str) -> (String, String) {
    let trimmed = content.trim_start();
    if !trimmed.starts_with("---") {
        return (String::new(), content.to_string());
    }

    let after_open = &trimmed[3..];
    if let Some(close_idx) = after_open.find("\n---") {
        let yaml = after_open[..close_idx].trim().to_string();
        let body_start = close_idx + 4; // skip \n---
        let body = if body_start < after_open.len() {
            after_open[body_start..].trim_start_matches('\n').to_string()
        } else {
            String::new()
        };
        (yaml, body)
    } else {
        // Unclosed fence: treat everything as body
        (String::new(), content.to_string())
    }
}

/// Parse the YAML block into a flat mapping. Nested structures and list
/// items on their own lines are skipped.
fn parse_frontmatter(yaml: &str) -> Frontmatter {
    let mut values = BTreeMap::new();

    for line in yaml.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = trimmed.split_once(':') {
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() {
                // A bare `key:` opens a nested block we don't model
                continue;
            }

            let parsed = match value {
                "true" => FrontmatterValue::Bool(true),
                "false" => FrontmatterValue::Bool(false),
                _ if value.starts_with('[') => FrontmatterValue::List(parse_inline_list(value)),
                _ => FrontmatterValue::String(unquote(value)),
            };
            values.insert(key.to_string(), parsed);
        }
    }

    Frontmatter { values }
}

/// Extract checkbox tasks, one per matching line, in document order.
fn extract_checkboxes(body: &str) -> Vec<CheckboxTask> {
    let mut tasks = Vec::new();
    for line in body.lines() {
        if let Some(caps) = CHECKBOX_RE.captures(line) {
            tasks.push(CheckboxTask {
                task: caps[2].trim().to_string(),
                checked: &caps[1] == "x",
                raw_line: line.trim().to_string(),
            });
        }
    }
    tasks
}

/// Extract inline #tags from text, deduplicated.
fn extract_inline_tags(text: &str) -> BTreeSet<String> {
    INLINE_TAG_RE
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Remove surrounding quotes from a string
fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

/// Parse an inline YAML list like [foo, bar, "baz qux"]
fn parse_inline_list(s: &str) -> Vec<String> {
    let s = s.trim();
    let inner = if s.starts_with('[') && s.ends_with(']') {
        &s[1..s.len() - 1]
    } else {
        s
    };

    inner
        .split(',')
        .map(|item| unquote(item.trim()))
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_with_frontmatter() {
        let content = r#"---
title: "Weekly Plan"
secure: false
tags: [planning, weekly]
---

## Tasks
- [x] Build the project
- [ ] Write the changelog

Ship it with #deploy-staging today.
"#;
        let note = parse_note(content);
        assert_eq!(
            note.frontmatter.get("title"),
            Some(&FrontmatterValue::String("Weekly Plan".to_string()))
        );
        assert!(!note.frontmatter.get_bool("secure"));
        assert_eq!(note.checkboxes.len(), 2);
        assert_eq!(note.checkboxes[0].task, "Build the project");
        assert!(note.checkboxes[0].checked);
        assert_eq!(note.checkboxes[0].raw_line, "- [x] Build the project");
        assert!(!note.checkboxes[1].checked);
        assert!(note.tags.contains("deploy-staging"));
    }

    #[test]
    fn test_parse_note_no_frontmatter() {
        let note = parse_note("# Just a heading\n\nSome body text.");
        assert!(note.frontmatter.is_empty());
        assert!(note.body.contains("Just a heading"));
        assert!(note.checkboxes.is_empty());
        assert!(note.tags.is_empty());
    }

    #[test]
    fn test_parse_note_unclosed_fence() {
        let note = parse_note("---\ntitle: broken\nno closing fence");
        assert!(note.frontmatter.is_empty());
        assert!(note.body.contains("no closing fence"));
    }

    #[test]
    fn test_parse_note_never_panics_on_garbage() {
        for garbage in ["", "---", "----\n---\n", "[[[:::", "\u{0}\u{1}---\n"] {
            let _ = parse_note(garbage);
        }
    }

    #[test]
    fn test_secure_flag_requires_boolean_true() {
        assert!(parse_note("---\nsecure: true\n---\nbody").frontmatter.get_bool("secure"));
        assert!(!parse_note("---\nsecure: false\n---\nbody").frontmatter.get_bool("secure"));
        // Quoted "true" is a string, not a boolean
        assert!(!parse_note("---\nsecure: \"true\"\n---\nbody").frontmatter.get_bool("secure"));
        assert!(!parse_note("body only").frontmatter.get_bool("secure"));
    }

    #[test]
    fn test_checkbox_marker_is_case_sensitive() {
        let note = parse_note("- [x] done\n- [X] capital marker\n- [?] weird\n- [ ] open");
        assert_eq!(note.checkboxes.len(), 2);
        assert!(note.checkboxes[0].checked);
        assert!(!note.checkboxes[1].checked);
        assert_eq!(note.checkboxes[1].task, "open");
    }

    #[test]
    fn test_checkbox_indented_and_spaced() {
        let note = parse_note("  - [x] indented task\n-[ ] tight spacing");
        assert_eq!(note.checkboxes.len(), 2);
        assert_eq!(note.checkboxes[0].task, "indented task");
        assert_eq!(note.checkboxes[0].raw_line, "- [x] indented task");
        assert_eq!(note.checkboxes[1].task, "tight spacing");
    }

    #[test]
    fn test_tags_deduplicated_and_punctuation_stripped() {
        let note = parse_note("Deploying #deploy-staging now. Again #deploy-staging!\nAlso #backup.");
        assert_eq!(note.tags.len(), 2);
        assert!(note.tags.contains("deploy-staging"));
        assert!(note.tags.contains("backup"));
    }

    #[test]
    fn test_tags_not_extracted_from_frontmatter() {
        let note = parse_note("---\ntopic: #not-a-tag\n---\nBody with #real-tag");
        assert_eq!(note.tags.len(), 1);
        assert!(note.tags.contains("real-tag"));
    }

    #[test]
    fn test_inline_list_parsing() {
        let note = parse_note("---\ntags: [alpha, \"beta gamma\", 'delta']\n---\nbody");
        assert_eq!(
            note.frontmatter.get("tags"),
            Some(&FrontmatterValue::List(vec![
                "alpha".to_string(),
                "beta gamma".to_string(),
                "delta".to_string()
            ]))
        );
    }
}
