//! No-op extractor for degraded deployments

use super::traits::{ExtractionRequest, MediaExtractor};
use crate::error::Error;
use async_trait::async_trait;
use tracing::warn;

/// Extractor stub used when no yt-dlp binary is available
///
/// Every extraction fails with a clear "not supported" error, so the service
/// can still come up (and serve status/file endpoints) on hosts without the
/// extraction toolchain installed.
pub struct NoOpExtractor;

#[async_trait]
impl MediaExtractor for NoOpExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> crate::Result<()> {
        warn!(url = %request.url, "extraction requested but no extractor binary is available");
        Err(Error::NotSupported(
            "media extraction is unavailable: yt-dlp binary not found".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
