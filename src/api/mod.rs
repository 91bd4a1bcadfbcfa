//! REST API server module
//!
//! Provides the HTTP surface for the download service: job submission,
//! status polling, one-shot file delivery, and health/OpenAPI endpoints.

use crate::config::Config;
use crate::error::Result;
use crate::job::JobRunner;
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Jobs
/// - `POST /download_start` - Submit a URL, get a job id
/// - `GET /download_status/:id` - Poll a job's status record
///
/// ## Files
/// - `GET /get_file/:filename` - Fetch a finished artifact (one-shot)
///
/// ## System
/// - `GET /health` - Health check with storage diagnostics
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(runner: JobRunner, config: Arc<Config>) -> Router {
    let state = AppState::new(runner, config.clone());

    let router = Router::new()
        // Jobs
        .route("/download_start", post(routes::download_start))
        .route("/download_status/:id", get(routes::download_status))
        // Files
        .route("/get_file/:filename", get(routes::get_file))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    // Merge Swagger UI routes if enabled in config (before applying state)
    // Note: SwaggerUi will use the existing /openapi.json endpoint we already defined
    let router = if config.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    // Add state to all routes
    let router = router.with_state(state);

    // Apply CORS middleware if enabled in config
    if config.api.cors_enabled {
        let cors = build_cors_layer(&config.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// Supports "*" (or an empty list) for any origin, otherwise allows the
/// listed origins with all methods and headers.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Start the API server on the configured bind address.
///
/// This function creates a TCP listener, binds it to the configured address,
/// and serves the API router until a termination signal arrives. In-flight
/// requests are drained on shutdown; background jobs are not awaited, their
/// outcome stays observable through the status store after restart.
///
/// # Example
///
/// ```no_run
/// use media_dl::{Config, JobRunner, StatusStore, StorageArea};
/// use media_dl::extractor::CliExtractor;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let storage = Arc::new(StorageArea::new(&config.storage.dir).await?);
/// let store = Arc::new(StatusStore::new(storage.clone()));
/// let extractor = CliExtractor::from_config(&config).ok_or("yt-dlp not found")?;
/// let runner = JobRunner::new(storage, store, Arc::new(extractor), config.clone());
///
/// // Start API server (blocks until shutdown)
/// media_dl::api::start_api_server(runner, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(runner: JobRunner, config: Arc<Config>) -> Result<()> {
    let bind_address = config.api.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let app = create_router(runner, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(crate::wait_for_signal())
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
