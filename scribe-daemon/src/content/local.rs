//! Local-directory content store.
//!
//! Used when no WebDAV host is configured: the daemon watches a notes
//! folder on disk instead. Paths handed out are relative to the root.

use super::ContentStore;
use async_trait::async_trait;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn resolve(&self, dir: &str) -> PathBuf {
        let sub = dir.trim_start_matches('/');
        if sub.is_empty() {
            self.root.clone()
        } else {
            self.root.join(sub)
        }
    }
}

#[async_trait]
impl ContentStore for LocalStore {
    async fn list_files(&self, dir: &str) -> Result<Vec<String>, String> {
        let base = self.resolve(dir);
        if !base.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        visit_dir(&base, &mut paths)
            .map_err(|e| format!("failed to list {}: {}", base.display(), e))?;

        let mut files: Vec<String> = paths
            .into_iter()
            .filter_map(|p| relative_path(&self.root, &p))
            .collect();
        files.sort();
        Ok(files)
    }

    async fn read_file(&self, path: &str) -> Result<String, String> {
        let full = self.root.join(path.trim_start_matches('/'));
        tokio::fs::read_to_string(&full)
            .await
            .map_err(|e| format!("failed to read {}: {}", full.display(), e))
    }
}

/// Recursively collect regular files, skipping hidden files and directories
/// (state databases, editor droppings).
fn visit_dir(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with('.'))
            .unwrap_or(false)
        {
            continue;
        }
        if path.is_dir() {
            visit_dir(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

fn relative_path(root: &Path, file_path: &Path) -> Option<String> {
    file_path
        .strip_prefix(root)
        .ok()
        .map(|p| p.to_string_lossy().to_string())
}
