//! Clone and stage/commit/push workflows

use mend_core::{GitStep, MendError, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::command::GitExecutor;

/// Runs git workflows through an injected executor.
///
/// Failures are terminal: nothing is retried and nothing already done is
/// rolled back. If push fails after a successful commit, the commit stays in
/// the local checkout.
#[derive(Clone)]
pub struct GitGateway {
    executor: Arc<dyn GitExecutor>,
}

impl GitGateway {
    pub fn new(executor: Arc<dyn GitExecutor>) -> Self {
        Self { executor }
    }

    /// `git clone --branch <branch> -- <url> <dest>`
    pub async fn clone_repo(&self, url: &str, branch: &str, dest: &Path) -> Result<()> {
        let dest = path_arg(dest)?;
        info!("Cloning {} (branch {}) into {}", url, branch, dest);

        // `--branch` consumes the next argument, so only url and dest need `--`
        self.run(GitStep::Clone, &["clone", "--branch", branch, "--", url, dest])
            .await
    }

    /// Stage one file, commit it, push the current branch.
    ///
    /// Stops at the first failing step and reports that step's stderr.
    pub async fn stage_commit_push(&self, repo: &Path, file: &str, message: &str) -> Result<()> {
        let repo = path_arg(repo)?;
        info!("Committing {} in {}", file, repo);

        self.run(GitStep::Add, &["-C", repo, "add", "--", file])
            .await?;
        self.run(GitStep::Commit, &["-C", repo, "commit", "-m", message])
            .await?;
        self.run(GitStep::Push, &["-C", repo, "push"]).await?;

        info!("Pushed {} from {}", file, repo);
        Ok(())
    }

    async fn run(&self, step: GitStep, args: &[&str]) -> Result<()> {
        let output = self.executor.exec(args).await?;
        if output.success {
            Ok(())
        } else {
            warn!("git {} failed: {}", step, output.stderr.trim_end());
            Err(MendError::Vcs {
                step,
                stderr: output.stderr,
            })
        }
    }
}

fn path_arg(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        MendError::InvalidInput(format!("path is not valid UTF-8: {}", path.display()))
    })
}
