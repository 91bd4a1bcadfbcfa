//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`jobs`] — Job submission and status polling
//! - [`files`] — One-shot artifact delivery
//! - [`system`] — Health and OpenAPI

use crate::types::{JobId, MediaFormat};
use serde::{Deserialize, Serialize};

mod files;
mod jobs;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use files::*;
pub use jobs::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /download_start
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DownloadStartRequest {
    /// Media URL to download; the request is rejected when missing or empty
    pub url: Option<String>,
    /// Target format ("mp3" or "mp4"); anything else falls back to mp3
    #[serde(default)]
    pub format: MediaFormat,
}

/// Response body for POST /download_start
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DownloadStartResponse {
    /// Whether the job was accepted
    pub success: bool,
    /// The id to poll and fetch with, present on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_id: Option<JobId>,
    /// Human-readable outcome message
    pub message: String,
}
