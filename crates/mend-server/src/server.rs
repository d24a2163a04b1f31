//! Axum web server and route handlers

use crate::assets;
use crate::error::ApiError;
use axum::{
    extract::{Path, State},
    response::{Json, Redirect},
    routing::{get, post},
    Router,
};
use mend_core::{
    CloneRequest, CloneResponse, CommitRequest, FileListResponse, FileResponse, ImproveRequest,
    RepoListResponse,
};
use mend_orchestrator::Orchestrator;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
pub struct AppState {
    pub orchestrator: Orchestrator,
}

pub type SharedState = Arc<AppState>;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// All routes, with permissive CORS
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/clone_repo/", post(clone_repo))
        .route("/list_repos/", get(list_repos))
        .route("/list_files/:repo_name", get(list_files))
        .route("/improve_code/", post(improve_code))
        .route("/commit_changes/", post(commit_changes))
        .route("/static/*path", get(assets::static_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until Ctrl+C
pub async fn serve(state: SharedState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// GET / - redirect to the UI
async fn index() -> Redirect {
    Redirect::temporary("/static/index.html")
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "mend"
    }))
}

/// POST /clone_repo/
async fn clone_repo(
    State(app): State<SharedState>,
    Json(request): Json<CloneRequest>,
) -> ApiResult<CloneResponse> {
    Ok(Json(app.orchestrator.clone_repository(&request).await?))
}

/// GET /list_repos/
async fn list_repos(State(app): State<SharedState>) -> ApiResult<RepoListResponse> {
    Ok(Json(app.orchestrator.list_repositories().await?))
}

/// GET /list_files/{repo_name}
async fn list_files(
    State(app): State<SharedState>,
    Path(repo_name): Path<String>,
) -> ApiResult<FileListResponse> {
    Ok(Json(app.orchestrator.list_files(&repo_name).await?))
}

/// POST /improve_code/
async fn improve_code(
    State(app): State<SharedState>,
    Json(request): Json<ImproveRequest>,
) -> ApiResult<FileResponse> {
    Ok(Json(app.orchestrator.improve_file(&request).await?))
}

/// POST /commit_changes/
async fn commit_changes(
    State(app): State<SharedState>,
    Json(request): Json<CommitRequest>,
) -> ApiResult<FileResponse> {
    Ok(Json(app.orchestrator.commit_changes(&request).await?))
}
