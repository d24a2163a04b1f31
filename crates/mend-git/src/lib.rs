//! # mend-git
//!
//! Runs the `git` binary for the two workflows Mend needs: cloning a branch
//! into the workspace, and staging, committing and pushing a single file.
//!
//! Commands go through the [`GitExecutor`] trait so the gateway can be
//! exercised against [`MockGitExecutor`] without touching the network.

mod auth;
mod command;
mod gateway;

pub use auth::{auth_header, scoped_auth_config, token_from_env};
pub use command::{GitCommand, GitExecutor, GitOutput, MockGitExecutor};
pub use gateway::GitGateway;
