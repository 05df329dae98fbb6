//! Markdown note parsing - YAML frontmatter, checkbox tasks, inline #tags.

pub mod frontmatter;

pub use frontmatter::{CheckboxTask, Frontmatter, FrontmatterValue, ParsedNote, parse_note};
