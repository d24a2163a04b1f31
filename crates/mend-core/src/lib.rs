//! # mend-core
//!
//! Core types for the Mend code-improvement service.
//!
//! Mend clones a git repository into a local workspace, lists its source
//! files, asks a text-generation API to rewrite one file, and commits the
//! result back. This crate holds the pieces every other crate shares:
//!
//! - [`MendError`], the unified error taxonomy
//! - [`MendConfig`], the TOML-backed service configuration
//! - the request/response shapes exchanged over HTTP

pub mod config;
mod error;
mod types;

pub use config::{AiConfig, GitConfig, MendConfig, ServerConfig, WorkspaceConfig};
pub use error::{GitStep, MendError, Result};
pub use types::*;
