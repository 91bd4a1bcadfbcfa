//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the media-dl REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-dl REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation (if enabled)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-dl REST API",
        version = "0.1.0",
        description = "Submit a media URL, poll the job, fetch the file once",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        // Jobs
        crate::api::routes::download_start,
        crate::api::routes::download_status,

        // Files
        crate::api::routes::get_file,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::JobId,
        crate::types::JobState,
        crate::types::MediaFormat,

        // Status record from store.rs
        crate::store::StatusRecord,

        // Config types from config.rs
        crate::config::Config,
        crate::config::StorageConfig,
        crate::config::ExtractionConfig,
        crate::config::ApiConfig,

        // API request/response types from routes
        crate::api::routes::DownloadStartRequest,
        crate::api::routes::DownloadStartResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "downloads", description = "Job submission and status polling"),
        (name = "files", description = "One-shot delivery of finished artifacts"),
        (name = "system", description = "Health checks and OpenAPI spec"),
    )
)]
pub struct ApiDoc;
