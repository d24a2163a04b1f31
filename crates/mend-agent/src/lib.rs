//! # mend-agent
//!
//! Text-generation client for Mend.
//!
//! A rewrite is a single stateless chat-completion call: the prompt embeds
//! the improvement category and the whole file, and the first completion is
//! taken verbatim as the new file content. There is no streaming, no
//! multi-turn conversation and no retry.

mod auth;
mod client;
mod prompt;
mod types;

pub use auth::get_api_key;
pub use client::{MockRewriter, RewriteClient, Rewriter};
pub use prompt::build_prompt;
pub use types::*;
