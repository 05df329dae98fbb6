use dotenv::dotenv;
use std::sync::Arc;

use scribe_daemon::actions::{ActionRegistry, ShellRunner};
use scribe_daemon::config::{self, Config};
use scribe_daemon::content::{ContentStore, LocalStore, WebDavStore};
use scribe_daemon::dispatch::{Dispatcher, JsonStateStore};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    if let Err(e) = config::initialize_workspace(&config) {
        log::error!("[CONFIG] Failed to prepare working directories: {}", e);
        std::process::exit(1);
    }

    let registry = ActionRegistry::load(&config.actions_file);
    if registry.is_empty() {
        log::warn!("[ACTIONS] Action registry is empty - the dispatcher will run but never match");
    } else {
        log::info!(
            "[ACTIONS] Loaded {} action mapping(s) from {}",
            registry.len(),
            config.actions_file.display()
        );
    }

    let content: Arc<dyn ContentStore> = match &config.webdav {
        Some(credentials) => match WebDavStore::new(credentials) {
            Ok(store) => {
                log::info!(
                    "[WEBDAV] Watching '{}' on {}",
                    config.remote_dir,
                    credentials.hostname
                );
                Arc::new(store)
            }
            Err(e) => {
                log::error!("[WEBDAV] {}", e);
                std::process::exit(1);
            }
        },
        None => {
            log::info!(
                "[NOTES] No WebDAV host configured - watching local directory {}",
                config.notes_dir.display()
            );
            Arc::new(LocalStore::new(config.notes_dir.clone()))
        }
    };

    let runner = Arc::new(ShellRunner::new(config.command_timeout));
    let store = Box::new(JsonStateStore::new(config.state_file.clone()));

    let dispatcher = match Dispatcher::new(
        config.remote_dir.clone(),
        config.poll_interval,
        registry,
        content,
        runner,
        store,
    ) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            log::error!("[STATE] {}", e);
            log::error!(
                "[STATE] Refusing to start with an unreadable dispatch ledger - fix or remove {}",
                config.state_file.display()
            );
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let dispatcher_handle = tokio::spawn(dispatcher.run(shutdown_rx));

    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Interrupt received - shutting down"),
        Err(e) => log::error!("Failed to listen for shutdown signal: {} - shutting down", e),
    }

    // The dispatcher finishes its in-flight directive before exiting
    let _ = shutdown_tx.send(());
    let _ = dispatcher_handle.await;

    log::info!("Dispatcher stopped");
}
