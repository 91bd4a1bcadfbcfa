//! File delivery handler
//!
//! Artifacts are served exactly once: the file is opened, unlinked, and then
//! streamed from the still-open handle. A second request for the same name
//! finds nothing on disk and gets 404, while an in-flight first response
//! keeps streaming because the unix filesystem holds the data until the
//! handle closes.

use crate::api::AppState;
use crate::error::{ApiError, Error};
use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

/// Content type for a delivered artifact, derived from its extension
///
/// Returns None for anything but the two artifact extensions the service
/// produces, which doubles as the delivery allowlist.
fn artifact_content_type(filename: &str) -> Option<&'static str> {
    let extension = std::path::Path::new(filename).extension()?.to_str()?;
    match extension {
        "mp3" => Some("audio/mpeg"),
        "mp4" => Some("video/mp4"),
        _ => None,
    }
}

fn forbidden(message: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ApiError::new("forbidden", message)),
    )
        .into_response()
}

/// GET /get_file/:filename - Fetch a finished artifact, once
#[utoipa::path(
    get,
    path = "/get_file/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Artifact filename from the status record")
    ),
    responses(
        (status = 200, description = "The media file as an attachment", content_type = "application/octet-stream"),
        (status = 403, description = "Filename rejected (traversal or disallowed extension)", body = crate::error::ApiError),
        (status = 404, description = "File does not exist (never existed, already fetched, or reclaimed)", body = crate::error::ApiError)
    )
)]
pub async fn get_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, Error> {
    // Names must stay inside the flat storage area
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        warn!(%filename, "rejected file request with path separators");
        return Ok(forbidden("invalid filename"));
    }
    let Some(content_type) = artifact_content_type(&filename) else {
        warn!(%filename, "rejected file request with disallowed extension");
        return Ok(forbidden("only mp3 and mp4 files are served"));
    };

    let path = state.runner.storage().resolve(&filename);
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound(format!("file {}", filename)));
        }
        Err(e) => return Err(e.into()),
    };

    // Unlink before streaming so the artifact can never be fetched twice;
    // the open handle keeps the bytes alive for this response
    if let Err(e) = state.runner.storage().remove_file(&path).await {
        warn!(%filename, error = %e, "could not unlink artifact before delivery");
    }
    info!(%filename, "delivering artifact");

    let size = file.metadata().await.ok().map(|m| m.len());
    let stream = ReaderStream::new(file);

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        );
    if let Some(size) = size {
        response = response.header(header::CONTENT_LENGTH, size);
    }
    response
        .body(Body::from_stream(stream))
        .map_err(|e| Error::ApiServerError(e.to_string()))
}
