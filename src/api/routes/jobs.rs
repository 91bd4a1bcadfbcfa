//! Job handlers: submission and status polling

use crate::api::AppState;
use crate::api::routes::{DownloadStartRequest, DownloadStartResponse};
use crate::error::Error;
use crate::janitor;
use crate::types::JobId;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::info;

/// POST /download_start - Submit a URL and get back a pollable job id
///
/// Accepting the job only means the background task was spawned; the
/// download's outcome is observable solely through the status endpoint.
#[utoipa::path(
    post,
    path = "/download_start",
    tag = "downloads",
    request_body = DownloadStartRequest,
    responses(
        (status = 200, description = "Job accepted and started", body = DownloadStartResponse),
        (status = 400, description = "Missing or empty URL", body = DownloadStartResponse)
    )
)]
pub async fn download_start(
    State(state): State<AppState>,
    Json(request): Json<DownloadStartRequest>,
) -> impl IntoResponse {
    let url = request.url.as_deref().map(str::trim).unwrap_or_default();
    if url.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(DownloadStartResponse {
                success: false,
                download_id: None,
                message: "No URL provided".to_string(),
            }),
        );
    }

    // Opportunistic cleanup piggybacks on job submission
    janitor::sweep(state.runner.storage(), state.config.storage.retention()).await;

    let id = JobId::generate();
    info!(job_id = %id, format = ?request.format, "accepted download job");
    // Fire-and-forget; the handle is not retained
    state
        .runner
        .start(id.clone(), url.to_string(), request.format);

    (
        StatusCode::OK,
        Json(DownloadStartResponse {
            success: true,
            download_id: Some(id),
            message: "Download started".to_string(),
        }),
    )
}

/// GET /download_status/:id - Poll the state of a job
///
/// An id that passes validation but has no record yet reads as `pending`,
/// covering both the startup race (job spawned, first record not yet
/// written) and ids that were never issued.
#[utoipa::path(
    get,
    path = "/download_status/{id}",
    tag = "downloads",
    params(
        ("id" = String, Path, description = "Job id returned by download_start")
    ),
    responses(
        (status = 200, description = "Current status record, or pending when none exists", body = crate::store::StatusRecord),
        (status = 400, description = "Malformed job id", body = crate::error::ApiError)
    )
)]
pub async fn download_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    if !JobId::is_valid_key(&id) {
        return Err(Error::InvalidRequest("malformed download id".to_string()));
    }

    let id = JobId::from(id);
    let body = match state.runner.store().read(&id).await? {
        Some(record) => serde_json::to_value(&record)?,
        None => json!({ "state": "pending" }),
    };
    Ok(Json(body))
}
