use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const WEBDAV_HOSTNAME: &str = "WEBDAV_HOSTNAME";
    pub const WEBDAV_LOGIN: &str = "WEBDAV_LOGIN";
    pub const WEBDAV_PASSWORD: &str = "WEBDAV_PASSWORD";
    /// Directory watched on the content store (remote path or subdirectory
    /// of the local notes dir).
    pub const REMOTE_DIR: &str = "SCRIBE_REMOTE_DIR";
    /// Local notes directory, used when no WebDAV host is configured.
    pub const NOTES_DIR: &str = "SCRIBE_NOTES_DIR";
    pub const POLL_INTERVAL_SECS: &str = "SCRIBE_POLL_INTERVAL_SECS";
    pub const ACTIONS_FILE: &str = "SCRIBE_ACTIONS_FILE";
    pub const STATE_FILE: &str = "SCRIBE_STATE_FILE";
    /// Upper bound on a single action command, in seconds. 0 disables.
    pub const COMMAND_TIMEOUT_SECS: &str = "SCRIBE_COMMAND_TIMEOUT_SECS";
}

/// Default values
pub mod defaults {
    pub const REMOTE_DIR: &str = "/";
    pub const NOTES_DIR: &str = "notes";
    pub const POLL_INTERVAL_SECS: u64 = 15;
    pub const ACTIONS_FILE: &str = "config/actions.toml";
    pub const STATE_FILE: &str = ".scribe/state.json";
    pub const COMMAND_TIMEOUT_SECS: u64 = 300;
}

/// Credentials for the WebDAV content store. All three must be present for
/// remote mode; otherwise the daemon watches the local notes directory.
#[derive(Debug, Clone)]
pub struct WebDavCredentials {
    pub hostname: String,
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub webdav: Option<WebDavCredentials>,
    pub remote_dir: String,
    pub notes_dir: PathBuf,
    pub poll_interval: Duration,
    pub actions_file: PathBuf,
    pub state_file: PathBuf,
    /// None when the timeout is disabled.
    pub command_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Self {
        let webdav = webdav_from_env();

        let poll_secs = env_u64(env_vars::POLL_INTERVAL_SECS, defaults::POLL_INTERVAL_SECS).max(1);
        let timeout_secs = env_u64(
            env_vars::COMMAND_TIMEOUT_SECS,
            defaults::COMMAND_TIMEOUT_SECS,
        );

        Self {
            webdav,
            remote_dir: env::var(env_vars::REMOTE_DIR)
                .unwrap_or_else(|_| defaults::REMOTE_DIR.to_string()),
            notes_dir: PathBuf::from(
                env::var(env_vars::NOTES_DIR).unwrap_or_else(|_| defaults::NOTES_DIR.to_string()),
            ),
            poll_interval: Duration::from_secs(poll_secs),
            actions_file: PathBuf::from(
                env::var(env_vars::ACTIONS_FILE)
                    .unwrap_or_else(|_| defaults::ACTIONS_FILE.to_string()),
            ),
            state_file: PathBuf::from(
                env::var(env_vars::STATE_FILE).unwrap_or_else(|_| defaults::STATE_FILE.to_string()),
            ),
            command_timeout: if timeout_secs == 0 {
                None
            } else {
                Some(Duration::from_secs(timeout_secs))
            },
        }
    }
}

fn webdav_from_env() -> Option<WebDavCredentials> {
    let hostname = env::var(env_vars::WEBDAV_HOSTNAME).ok()?;
    let login = env::var(env_vars::WEBDAV_LOGIN).ok();
    let password = env::var(env_vars::WEBDAV_PASSWORD).ok();

    match (login, password) {
        (Some(login), Some(password)) => Some(WebDavCredentials {
            hostname,
            login,
            password,
        }),
        _ => {
            log::warn!(
                "[CONFIG] {} is set but {}/{} are missing - falling back to the local notes directory",
                env_vars::WEBDAV_HOSTNAME,
                env_vars::WEBDAV_LOGIN,
                env_vars::WEBDAV_PASSWORD
            );
            None
        }
    }
}

/// Parse a u64 env var, falling back to the default on absence or garbage.
fn env_u64(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                log::warn!(
                    "[CONFIG] {} is not a valid number ('{}') - using default {}",
                    name,
                    value,
                    default
                );
                default
            }
        },
        Err(_) => default,
    }
}

/// Create the directories the daemon writes into.
/// Called once at startup before the poll loop begins.
pub fn initialize_workspace(config: &Config) -> std::io::Result<()> {
    if let Some(parent) = config.state_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Local mode watches a directory on disk; make sure it exists so the
    // first poll doesn't log a listing failure.
    if config.webdav.is_none() {
        std::fs::create_dir_all(&config.notes_dir)?;
    }

    Ok(())
}
