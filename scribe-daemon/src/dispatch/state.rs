//! Durable dispatch ledger.
//!
//! Records which directives have already been dispatched so each one fires
//! at most once per occurrence for the lifetime of the store. The ledger
//! only ever grows; nothing is ever removed from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::PathBuf;

/// Fingerprint of a checkbox line: SHA-256 over the trimmed raw line text,
/// hex-encoded. The marker and the wording both feed the digest, so editing
/// either produces a new fingerprint - a reworded task counts as new.
pub fn task_fingerprint(raw_line: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_line.trim().as_bytes());
    hex::encode(hasher.finalize())
}

/// The three dispatch ledgers. BTree collections keep the serialized file
/// deterministic across saves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchState {
    /// Fingerprints of checkbox lines observed in the checked state.
    pub processed_task_hashes: BTreeSet<String>,
    /// Per-file sets of tags already dispatched.
    pub processed_tags: BTreeMap<String, BTreeSet<String>>,
    /// Files whose secure directive has been dispatched.
    pub processed_secure_files: BTreeSet<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DispatchState {
    pub fn task_processed(&self, fingerprint: &str) -> bool {
        self.processed_task_hashes.contains(fingerprint)
    }

    pub fn mark_task(&mut self, fingerprint: String) {
        self.processed_task_hashes.insert(fingerprint);
        self.touch();
    }

    pub fn tag_processed(&self, file_path: &str, tag: &str) -> bool {
        self.processed_tags
            .get(file_path)
            .map(|tags| tags.contains(tag))
            .unwrap_or(false)
    }

    pub fn mark_tag(&mut self, file_path: &str, tag: String) {
        self.processed_tags
            .entry(file_path.to_string())
            .or_default()
            .insert(tag);
        self.touch();
    }

    pub fn secure_processed(&self, file_path: &str) -> bool {
        self.processed_secure_files.contains(file_path)
    }

    pub fn mark_secure(&mut self, file_path: String) {
        self.processed_secure_files.insert(file_path);
        self.touch();
    }

    /// Total recorded directives, for startup logging.
    pub fn total_entries(&self) -> usize {
        self.processed_task_hashes.len()
            + self.processed_tags.values().map(|t| t.len()).sum::<usize>()
            + self.processed_secure_files.len()
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// Loads and persists the dispatch ledger.
pub trait StateStore: Send + Sync {
    /// Missing backing storage yields the empty state. Corrupt storage is
    /// an error - loading it as empty would re-dispatch everything.
    fn load(&self) -> Result<DispatchState, String>;

    fn save(&self, state: &DispatchState) -> Result<(), String>;
}

/// JSON file-backed state store.
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<DispatchState, String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!(
                    "[STATE] No state file at {} - starting with an empty ledger",
                    self.path.display()
                );
                return Ok(DispatchState::default());
            }
            Err(e) => return Err(format!("failed to read {}: {}", self.path.display(), e)),
        };

        serde_json::from_str(&content)
            .map_err(|e| format!("failed to parse {}: {}", self.path.display(), e))
    }

    fn save(&self, state: &DispatchState) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("failed to create {}: {}", parent.display(), e))?;
            }
        }

        let json = serde_json::to_string_pretty(state)
            .map_err(|e| format!("failed to serialize state: {}", e))?;
        std::fs::write(&self.path, json)
            .map_err(|e| format!("failed to write {}: {}", self.path.display(), e))
    }
}
