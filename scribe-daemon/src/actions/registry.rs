//! Static keyword -> shell command mappings, loaded once at startup.

use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::path::Path;

/// The fixed keyword looked up in `secure_actions` for secure notes.
pub const SECURE_ACTION_KEYWORD: &str = "encrypt_and_store";

/// Which of the three registry namespaces a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Checkbox,
    Tag,
    Secure,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Checkbox => "checkbox_actions",
            ActionKind::Tag => "tag_actions",
            ActionKind::Secure => "secure_actions",
        }
    }
}

/// The action registry document: three flat tables of keyword -> command.
/// Immutable for the process lifetime.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionRegistry {
    #[serde(default)]
    pub checkbox_actions: HashMap<String, String>,
    #[serde(default)]
    pub tag_actions: HashMap<String, String>,
    #[serde(default)]
    pub secure_actions: HashMap<String, String>,
}

impl ActionRegistry {
    /// Load the registry from a TOML document. A missing or unparseable
    /// file degrades to an empty registry so the daemon still runs; it
    /// just never matches anything.
    pub fn load(path: &Path) -> ActionRegistry {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!(
                    "[ACTIONS] No action registry at {} - no actions will be dispatched",
                    path.display()
                );
                return ActionRegistry::default();
            }
            Err(e) => {
                log::error!("[ACTIONS] Failed to read {}: {}", path.display(), e);
                return ActionRegistry::default();
            }
        };

        match toml::from_str(&content) {
            Ok(registry) => registry,
            Err(e) => {
                log::error!("[ACTIONS] Failed to parse {}: {}", path.display(), e);
                ActionRegistry::default()
            }
        }
    }

    /// Exact-match lookup. No prefix, fuzzy, or wildcard matching.
    pub fn resolve(&self, kind: ActionKind, keyword: &str) -> Option<&str> {
        let table = match kind {
            ActionKind::Checkbox => &self.checkbox_actions,
            ActionKind::Tag => &self.tag_actions,
            ActionKind::Secure => &self.secure_actions,
        };
        table.get(keyword).map(|command| command.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of mappings across all three namespaces.
    pub fn len(&self) -> usize {
        self.checkbox_actions.len() + self.tag_actions.len() + self.secure_actions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_registry() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[checkbox_actions]
"Build the project" = "npm run build"

[tag_actions]
deploy-staging = "echo deploying"

[secure_actions]
encrypt_and_store = "./encrypt.sh"
"#
        )
        .unwrap();

        let registry = ActionRegistry::load(file.path());
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.resolve(ActionKind::Checkbox, "Build the project"),
            Some("npm run build")
        );
        assert_eq!(
            registry.resolve(ActionKind::Tag, "deploy-staging"),
            Some("echo deploying")
        );
        assert_eq!(
            registry.resolve(ActionKind::Secure, SECURE_ACTION_KEYWORD),
            Some("./encrypt.sh")
        );
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let registry = ActionRegistry::load(Path::new("/nonexistent/actions.toml"));
        assert!(registry.is_empty());
        assert_eq!(registry.resolve(ActionKind::Tag, "anything"), None);
    }

    #[test]
    fn test_invalid_toml_degrades_to_empty() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "this is [not valid toml").unwrap();

        let registry = ActionRegistry::load(file.path());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_partial_document_is_fine() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[tag_actions]\nbackup = \"./backup.sh\"\n").unwrap();

        let registry = ActionRegistry::load(file.path());
        assert_eq!(registry.len(), 1);
        assert!(registry.checkbox_actions.is_empty());
        assert!(registry.secure_actions.is_empty());
    }

    #[test]
    fn test_resolve_is_exact_match_only() {
        let mut registry = ActionRegistry::default();
        registry
            .checkbox_actions
            .insert("Build the project".to_string(), "npm run build".to_string());

        assert!(registry.resolve(ActionKind::Checkbox, "Build").is_none());
        assert!(registry.resolve(ActionKind::Checkbox, "build the project").is_none());
        // Namespaces are independent
        assert!(registry.resolve(ActionKind::Tag, "Build the project").is_none());
    }
}
