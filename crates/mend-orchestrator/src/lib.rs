//! # mend-orchestrator
//!
//! Sequences the Mend workflows: clone into the workspace, list repositories
//! and source files, rewrite a file through the text-generation client, and
//! commit/push it back.
//!
//! The only durable state is the filesystem checkout. Git and the
//! text-generation client are injected at construction so tests can swap in
//! fakes.

mod enumerate;
mod locks;
mod orchestrator;
mod workspace;

pub use enumerate::list_source_files;
pub use locks::{RepoGuard, RepoLocks};
pub use orchestrator::Orchestrator;
pub use workspace::{repo_name_from_url, validate_file_path, WorkspaceManager};
