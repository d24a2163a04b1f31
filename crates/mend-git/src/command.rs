//! Git command execution abstraction

use async_trait::async_trait;
use mend_core::{MendError, Result};
use std::collections::HashMap;
use std::process::Output;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::auth::scoped_auth_config;

/// Output from a git command
#[derive(Debug, Clone)]
pub struct GitOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl GitOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
        }
    }

    /// Failed output with the given stderr
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
        }
    }
}

impl From<Output> for GitOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        }
    }
}

/// Trait for executing git commands (allows mocking in tests)
#[async_trait]
pub trait GitExecutor: Send + Sync {
    /// Execute git with the given arguments. A non-zero exit is reported in
    /// the output, not as an error.
    async fn exec(&self, args: &[&str]) -> Result<GitOutput>;
}

/// Real git command executor
#[derive(Clone)]
pub struct GitCommand {
    binary: String,
    timeout: Duration,
    /// `http.<url>.extraHeader=...` passed with `-c`
    auth_config: Option<String>,
}

impl std::fmt::Debug for GitCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitCommand")
            .field("binary", &self.binary)
            .field("timeout", &self.timeout)
            .field("authenticated", &self.auth_config.is_some())
            .finish()
    }
}

impl GitCommand {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            auth_config: None,
        }
    }

    /// Send `token` to remotes under `auth_url` only. Git matches the URL
    /// prefix per request, so other hosts never see the header.
    pub fn with_token(mut self, auth_url: &str, token: Option<String>) -> Self {
        self.auth_config = token.and_then(|token| scoped_auth_config(auth_url, &token));
        self
    }
}

#[async_trait]
impl GitExecutor for GitCommand {
    #[instrument(skip(self), fields(binary = %self.binary))]
    async fn exec(&self, args: &[&str]) -> Result<GitOutput> {
        debug!("Executing git {:?}", args);

        let mut command = Command::new(&self.binary);
        if let Some(auth) = &self.auth_config {
            command.arg("-c").arg(auth);
        }
        command
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                MendError::Timeout(format!(
                    "git {} did not finish within {}s",
                    args.first().copied().unwrap_or_default(),
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| MendError::GitCommand(format!("Failed to execute git: {}", e)))?;

        let git_output = GitOutput::from(output);

        if !git_output.success {
            debug!("Git command failed: {}", git_output.stderr);
        }

        Ok(git_output)
    }
}

type Effect = Arc<dyn Fn() + Send + Sync>;

/// Mock git executor for testing
///
/// Responses are keyed by the space-joined argument list. Every call is
/// recorded, and an optional effect can simulate what git would have done on
/// disk (e.g. populate a clone destination).
#[derive(Clone, Default)]
pub struct MockGitExecutor {
    responses: HashMap<String, GitOutput>,
    effects: HashMap<String, Effect>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockGitExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, command: &str, output: GitOutput) -> Self {
        self.responses.insert(command.to_string(), output);
        self
    }

    pub fn with_effect(mut self, command: &str, effect: impl Fn() + Send + Sync + 'static) -> Self {
        self.effects.insert(command.to_string(), Arc::new(effect));
        self
    }

    /// Commands executed so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl GitExecutor for MockGitExecutor {
    async fn exec(&self, args: &[&str]) -> Result<GitOutput> {
        let key = args.join(" ");
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(key.clone());

        let output = self
            .responses
            .get(&key)
            .cloned()
            .ok_or_else(|| MendError::GitCommand(format!("No mock response for: {}", key)))?;

        if let Some(effect) = self.effects.get(&key) {
            effect();
        }

        Ok(output)
    }
}
