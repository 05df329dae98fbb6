//! Prints what the note parser extracts from a file - frontmatter,
//! checkbox tasks, inline tags. Handy when debugging why a directive did
//! or didn't fire.
//!
//! Usage: parse_test [note.md]
//! Without an argument a built-in sample note is parsed.

use scribe_daemon::notes::parse_note;
use std::env;
use std::fs;

const SAMPLE: &str = r#"---
title: "Release checklist"
secure: false
tags: [automation, release]
---

## Tasks
- [x] Build the project
- [ ] Tag the release
- [ ] Update #documentation

Notes about the rollout live under #deploy-staging.
"#;

fn main() {
    let args: Vec<String> = env::args().collect();

    let (label, content) = match args.get(1) {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (path.clone(), content),
            Err(e) => {
                eprintln!("Failed to read {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => ("<built-in sample>".to_string(), SAMPLE.to_string()),
    };

    let note = parse_note(&content);

    println!("--- Parsed {} ---", label);

    println!("\n[1] Frontmatter:");
    if note.frontmatter.is_empty() {
        println!("  (none)");
    } else {
        for (key, value) in note.frontmatter.iter() {
            println!("  {}: {:?}", key, value);
        }
    }

    println!("\n[2] Checkbox tasks:");
    if note.checkboxes.is_empty() {
        println!("  (none)");
    } else {
        for task in &note.checkboxes {
            let status = if task.checked { "DONE" } else { "TODO" };
            println!("  [{}] {}", status, task.task);
        }
    }

    println!("\n[3] Inline tags:");
    if note.tags.is_empty() {
        println!("  (none)");
    } else {
        let tags: Vec<&str> = note.tags.iter().map(|t| t.as_str()).collect();
        println!("  {}", tags.join(", "));
    }
}
