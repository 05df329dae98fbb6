//! Shell command execution for dispatched actions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

/// Executes a directive's command. Injected into the dispatcher so tests
/// can substitute an in-memory fake.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` with `env` overlaid on the parent environment,
    /// blocking until it exits. Returns the exit code; spawn failures and
    /// timeouts are errors.
    async fn run(&self, command: &str, env: &HashMap<String, String>) -> Result<i32, String>;
}

/// Runs commands through `sh -c` in the daemon's working directory.
pub struct ShellRunner {
    timeout: Option<Duration>,
}

impl ShellRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str, env: &HashMap<String, String>) -> Result<i32, String> {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Reap the child if the timeout fires mid-run
            .kill_on_drop(true);

        for (key, value) in env {
            cmd.env(key, value);
        }

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(format!("command timed out after {}s", limit.as_secs()));
                }
            },
            None => cmd.output().await,
        };

        let output = output.map_err(|e| format!("failed to spawn command: {}", e))?;
        let code = output.status.code().unwrap_or(-1);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                log::warn!("[ACTIONS] Command stderr: {}", stderr.trim());
            }
        }

        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_reports_exit_code() {
        let runner = ShellRunner::new(None);
        assert_eq!(runner.run("true", &HashMap::new()).await, Ok(0));
        assert_eq!(runner.run("exit 3", &HashMap::new()).await, Ok(3));
    }

    #[tokio::test]
    async fn test_env_overlay_reaches_the_child() {
        let runner = ShellRunner::new(None);
        let env = HashMap::from([("SCRIBE_TEST_VALUE".to_string(), "expected".to_string())]);
        let code = runner
            .run("test \"$SCRIBE_TEST_VALUE\" = expected", &env)
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_timeout_is_a_failure() {
        let runner = ShellRunner::new(Some(Duration::from_millis(100)));
        let result = runner.run("sleep 5", &HashMap::new()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("timed out"));
    }
}
