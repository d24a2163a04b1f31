//! Request and response shapes for the Mend HTTP surface

use serde::{Deserialize, Serialize};

/// Body of `POST /clone_repo/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneRequest {
    pub repo_url: String,
    pub branch: String,
}

/// Body of `POST /improve_code/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImproveRequest {
    pub repo_name: String,
    /// Path relative to the repository root
    pub file_path: String,
    /// Open-ended category such as "bug_fix", "performance" or "cleanup"
    pub improvement_type: String,
}

/// Body of `POST /commit_changes/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRequest {
    pub repo_name: String,
    pub file_path: String,
    pub commit_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneResponse {
    pub message: String,
    pub repo_name: String,
}

/// Acknowledgment for operations acting on a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResponse {
    pub message: String,
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoListResponse {
    pub repos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileListResponse {
    pub files: Vec<String>,
}

/// Error body returned for every failed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
