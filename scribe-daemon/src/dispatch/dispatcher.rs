//! The poll loop: fetch notes, extract directives, dispatch commands.
//!
//! One sequential worker owns the dispatch state. Every dispatched
//! directive is marked processed and persisted immediately, whatever the
//! command's outcome, so a crash between dispatch and persistence can at
//! worst repeat one dispatch on restart - never lose one.

use crate::actions::{ActionKind, ActionRegistry, CommandRunner, SECURE_ACTION_KEYWORD};
use crate::content::ContentStore;
use crate::dispatch::state::{DispatchState, StateStore, task_fingerprint};
use crate::notes::{ParsedNote, parse_note};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Environment variable carrying the full note content into secure
/// actions. The content never appears in the command line or the logs.
pub const NOTE_CONTENT_ENV: &str = "SCRIBE_NOTE_CONTENT";

/// The tag that marks a note as secure, equivalent to `secure: true`
/// frontmatter.
const SECURE_JOURNAL_TAG: &str = "secure-journal";

pub struct Dispatcher {
    remote_dir: String,
    poll_interval: Duration,
    registry: ActionRegistry,
    content: Arc<dyn ContentStore>,
    runner: Arc<dyn CommandRunner>,
    store: Box<dyn StateStore>,
    state: DispatchState,
}

impl Dispatcher {
    /// Build a dispatcher, loading the persisted ledger. Fails only when
    /// the ledger exists but cannot be read - see `StateStore::load`.
    pub fn new(
        remote_dir: String,
        poll_interval: Duration,
        registry: ActionRegistry,
        content: Arc<dyn ContentStore>,
        runner: Arc<dyn CommandRunner>,
        store: Box<dyn StateStore>,
    ) -> Result<Self, String> {
        let state = store.load()?;
        log::info!(
            "[DISPATCH] Loaded dispatch state with {} recorded directive(s)",
            state.total_entries()
        );

        Ok(Self {
            remote_dir,
            poll_interval,
            registry,
            content,
            runner,
            store,
            state,
        })
    }

    /// Run until `shutdown` fires. The in-flight directive (command plus
    /// state persistence) always completes before exit; the shutdown
    /// signal is only checked between files and during the sleep.
    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        log::info!(
            "[DISPATCH] Watching '{}' every {}s",
            self.remote_dir,
            self.poll_interval.as_secs()
        );

        loop {
            if self.poll_cycle(&mut shutdown).await {
                break;
            }

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        log::info!("[DISPATCH] Poll loop stopped");
    }

    /// One poll cycle. Returns true when a shutdown request was observed
    /// mid-cycle.
    async fn poll_cycle(&mut self, shutdown: &mut oneshot::Receiver<()>) -> bool {
        log::debug!("[DISPATCH] Checking for updated notes");

        let files = match self.content.list_files(&self.remote_dir).await {
            Ok(files) => files,
            Err(e) => {
                log::error!("[DISPATCH] Failed to list notes: {}", e);
                return false;
            }
        };

        let md_files: Vec<String> = files.into_iter().filter(|f| f.ends_with(".md")).collect();
        log::debug!("[DISPATCH] {} note file(s) to evaluate", md_files.len());

        for file_path in md_files {
            if shutdown_requested(shutdown) {
                log::info!("[DISPATCH] Shutdown requested - cutting the cycle short");
                return true;
            }

            // A failed read skips this file only; the rest of the cycle
            // proceeds.
            let content = match self.content.read_file(&file_path).await {
                Ok(content) => content,
                Err(e) => {
                    log::warn!("[DISPATCH] Skipping '{}': {}", file_path, e);
                    continue;
                }
            };

            self.process_note(&file_path, &content).await;
        }

        false
    }

    /// Evaluate every directive in one note: checkboxes, then tags, then
    /// the secure flag.
    async fn process_note(&mut self, file_path: &str, content: &str) {
        let note = parse_note(content);
        self.process_checkboxes(file_path, &note).await;
        self.process_tags(file_path, &note).await;
        self.process_secure(file_path, &note, content).await;
    }

    async fn process_checkboxes(&mut self, file_path: &str, note: &ParsedNote) {
        for task in &note.checkboxes {
            if !task.checked {
                continue;
            }

            let fingerprint = task_fingerprint(&task.raw_line);
            if self.state.task_processed(&fingerprint) {
                continue;
            }

            log::info!(
                "[DISPATCH] New completed task in '{}': \"{}\"",
                file_path,
                task.task
            );
            self.dispatch(ActionKind::Checkbox, &task.task, file_path, None)
                .await;
            self.state.mark_task(fingerprint);
            self.persist();
        }
    }

    async fn process_tags(&mut self, file_path: &str, note: &ParsedNote) {
        for tag in &note.tags {
            if self.state.tag_processed(file_path, tag) {
                continue;
            }

            log::info!("[DISPATCH] New tag in '{}': #{}", file_path, tag);
            self.dispatch(ActionKind::Tag, tag, file_path, None).await;
            self.state.mark_tag(file_path, tag.clone());
            self.persist();
        }
    }

    async fn process_secure(&mut self, file_path: &str, note: &ParsedNote, content: &str) {
        let is_secure =
            note.frontmatter.get_bool("secure") || note.tags.contains(SECURE_JOURNAL_TAG);
        if !is_secure || self.state.secure_processed(file_path) {
            return;
        }

        log::info!("[DISPATCH] Secure note detected: '{}'", file_path);
        self.dispatch(ActionKind::Secure, SECURE_ACTION_KEYWORD, file_path, Some(content))
            .await;
        self.state.mark_secure(file_path.to_string());
        self.persist();
    }

    /// Resolve a directive against the registry and run its command. An
    /// unmatched keyword is logged and ignored; callers record the
    /// directive as processed either way.
    async fn dispatch(
        &self,
        kind: ActionKind,
        keyword: &str,
        file_path: &str,
        content: Option<&str>,
    ) {
        let Some(command) = self.registry.resolve(kind, keyword) else {
            log::info!(
                "[DISPATCH] No {} entry for '{}' (from '{}')",
                kind.as_str(),
                keyword,
                file_path
            );
            return;
        };

        let mut env = HashMap::new();
        if let Some(content) = content {
            env.insert(NOTE_CONTENT_ENV.to_string(), content.to_string());
        }

        log::info!("[DISPATCH] Executing command for '{}': {}", keyword, command);
        match self.runner.run(command, &env).await {
            Ok(0) => log::info!("[DISPATCH] Command for '{}' completed", keyword),
            Ok(code) => {
                log::warn!("[DISPATCH] Command for '{}' exited with code {}", keyword, code)
            }
            Err(e) => log::error!("[DISPATCH] Command for '{}' failed: {}", keyword, e),
        }
    }

    /// Persist the ledger after a mutation. Failures are logged and the
    /// loop continues.
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.state) {
            log::error!("[STATE] Failed to persist dispatch state: {}", e);
        }
    }
}

/// True once the shutdown sender has fired or been dropped. Only called
/// until it first returns true.
fn shutdown_requested(shutdown: &mut oneshot::Receiver<()>) -> bool {
    !matches!(
        shutdown.try_recv(),
        Err(oneshot::error::TryRecvError::Empty)
    )
}
