//! Request orchestration
//!
//! Every operation is request-in/response-out. Operations that mutate a
//! checkout (clone, improve, commit) hold the repository's lock for their
//! whole duration.

use mend_agent::{RewriteClient, Rewriter};
use mend_core::{
    CloneRequest, CloneResponse, CommitRequest, FileListResponse, FileResponse, ImproveRequest,
    MendConfig, MendError, RepoListResponse, Result,
};
use mend_git::{token_from_env, GitCommand, GitGateway};
use std::sync::Arc;
use tracing::info;

use crate::enumerate::list_source_files;
use crate::locks::RepoLocks;
use crate::workspace::{repo_name_from_url, WorkspaceManager};

const DEFAULT_SOURCE_EXTENSION: &str = ".py";

/// Coordinates the workspace, git and the text-generation client
pub struct Orchestrator {
    workspace: WorkspaceManager,
    git: GitGateway,
    rewriter: Arc<dyn Rewriter>,
    locks: RepoLocks,
    source_extension: String,
}

impl Orchestrator {
    pub fn new(workspace: WorkspaceManager, git: GitGateway, rewriter: Arc<dyn Rewriter>) -> Self {
        Self {
            workspace,
            git,
            rewriter,
            locks: RepoLocks::new(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
        }
    }

    pub fn with_source_extension(mut self, extension: &str) -> Self {
        self.source_extension = extension.to_string();
        self
    }

    /// Wire up the real git binary and API client from configuration
    pub fn from_config(config: &MendConfig) -> Result<Self> {
        let git = GitCommand::new(&config.git.binary, config.git.timeout())
            .with_token(&config.git.auth_host, token_from_env(&config.git.token_env));
        let rewriter = RewriteClient::from_config(&config.ai)?;

        info!(
            "Workspace at {}, listing *{} files",
            config.workspace.base_dir.display(),
            config.workspace.source_extension
        );

        Ok(Self::new(
            WorkspaceManager::from_config(&config.workspace),
            GitGateway::new(Arc::new(git)),
            Arc::new(rewriter),
        )
        .with_source_extension(&config.workspace.source_extension))
    }

    pub fn workspace(&self) -> &WorkspaceManager {
        &self.workspace
    }

    /// Clone `repo_url` at `branch`, replacing any checkout with the same name
    pub async fn clone_repository(&self, request: &CloneRequest) -> Result<CloneResponse> {
        let repo_name = repo_name_from_url(&request.repo_url)?;
        let _guard = self.locks.lock(&repo_name).await;

        let dest = self.workspace.prepare_for_clone(&repo_name).await?;
        self.git
            .clone_repo(&request.repo_url, &request.branch, &dest)
            .await?;

        info!("Cloned {} as {}", request.repo_url, repo_name);
        Ok(CloneResponse {
            message: "Repo cloned successfully".to_string(),
            repo_name,
        })
    }

    pub async fn list_repositories(&self) -> Result<RepoListResponse> {
        Ok(RepoListResponse {
            repos: self.workspace.list_repositories().await?,
        })
    }

    pub async fn list_files(&self, repo_name: &str) -> Result<FileListResponse> {
        let root = self.workspace.resolve_existing(repo_name).await?;
        let extension = self.source_extension.clone();

        let files = tokio::task::spawn_blocking(move || list_source_files(&root, &extension))
            .await
            .map_err(|e| MendError::Other(format!("File listing task failed: {}", e)))??;

        Ok(FileListResponse { files })
    }

    /// Rewrite one file through the text-generation client.
    ///
    /// The reply overwrites the file verbatim; nothing checks that it is
    /// valid code.
    pub async fn improve_file(&self, request: &ImproveRequest) -> Result<FileResponse> {
        self.workspace.resolve(&request.repo_name)?;
        let _guard = self.locks.lock(&request.repo_name).await;
        let path = self
            .workspace
            .resolve_file(&request.repo_name, &request.file_path)
            .await?;

        let code = tokio::fs::read_to_string(&path).await?;
        info!(
            "Improving {}/{} ({}, {} bytes)",
            request.repo_name,
            request.file_path,
            request.improvement_type,
            code.len()
        );

        let improved = self
            .rewriter
            .rewrite(&code, &request.improvement_type)
            .await?;
        tokio::fs::write(&path, improved.as_bytes()).await?;

        Ok(FileResponse {
            message: "Code improved successfully".to_string(),
            file_path: request.file_path.clone(),
        })
    }

    /// Stage, commit and push one file. A failed push leaves the local
    /// commit in place.
    pub async fn commit_changes(&self, request: &CommitRequest) -> Result<FileResponse> {
        let repo = self.workspace.resolve(&request.repo_name)?;
        let _guard = self.locks.lock(&request.repo_name).await;
        self.workspace
            .resolve_file(&request.repo_name, &request.file_path)
            .await?;

        self.git
            .stage_commit_push(&repo, &request.file_path, &request.commit_message)
            .await?;

        Ok(FileResponse {
            message: "Changes committed successfully".to_string(),
            file_path: request.file_path.clone(),
        })
    }
}
