//! # mend-server
//!
//! Axum HTTP surface for Mend: JSON endpoints for clone, list, improve and
//! commit, plus an embedded single-page UI under `/static`.

mod assets;
mod error;
mod server;

pub use error::ApiError;
pub use server::{router, serve, AppState, SharedState};

use mend_core::MendConfig;
use mend_orchestrator::Orchestrator;
use std::sync::Arc;
use tracing::info;

/// Build the orchestrator from configuration and serve until Ctrl+C
pub async fn run(config: MendConfig) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(&config)?;
    let addr = config.bind_addr();

    info!("Starting mend server on {}", addr);
    println!("Mend running at http://{}", addr);
    println!("Press Ctrl+C to stop");

    serve(Arc::new(AppState { orchestrator }), &addr).await
}
