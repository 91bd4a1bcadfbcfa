//! System handlers: health and OpenAPI

use crate::api::AppState;
use crate::janitor;
use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

/// GET /health - Health check with storage diagnostics
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    // Health probes double as a cleanup trigger, so a quiet deployment
    // still reclaims expired files eventually
    janitor::sweep(state.runner.storage(), state.config.storage.retention()).await;

    let files_count = state.runner.storage().file_count().await.unwrap_or(0);
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "downloads_dir": state.runner.storage().root().display().to_string(),
        "files_count": files_count,
        "proxy": state.config.extraction.proxy,
    }))
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI 3.1 specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}
