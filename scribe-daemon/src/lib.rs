//! scribe-daemon — watches a store of markdown notes and dispatches shell
//! commands for the directives embedded in them (checked checkboxes, inline
//! #tags, and the secure-journal flag).

pub mod actions;
pub mod config;
pub mod content;
pub mod dispatch;
pub mod notes;
