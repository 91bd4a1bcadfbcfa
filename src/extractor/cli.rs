//! CLI-based extractor using the external yt-dlp binary

use super::traits::{ExtractionRequest, MediaExtractor};
use super::DEFAULT_EXTRACTOR_BIN;
use crate::config::Config;
use crate::error::JobError;
use crate::types::MediaFormat;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// CLI-based extractor invoking the external yt-dlp binary
///
/// Builds an option set equivalent to the service's historical yt-dlp
/// configuration: best available stream for the requested kind, a
/// job-scoped output template, an ffmpeg extract-audio post-step for audio
/// jobs, and an optional egress proxy.
///
/// # Examples
///
/// ```no_run
/// use media_dl::extractor::CliExtractor;
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let extractor = CliExtractor::new(PathBuf::from("/usr/bin/yt-dlp"), "192K".to_string());
///
/// // Or auto-discover from PATH
/// let extractor = CliExtractor::from_path().expect("yt-dlp not found in PATH");
/// ```
pub struct CliExtractor {
    binary_path: PathBuf,
    audio_bitrate: String,
}

impl CliExtractor {
    /// Create a new CLI extractor with an explicit binary path
    pub fn new(binary_path: PathBuf, audio_bitrate: String) -> Self {
        Self {
            binary_path,
            audio_bitrate,
        }
    }

    /// Attempt to find yt-dlp in PATH, with the default audio bitrate
    pub fn from_path() -> Option<Self> {
        which::which(DEFAULT_EXTRACTOR_BIN)
            .ok()
            .map(|path| Self::new(path, "192K".to_string()))
    }

    /// Build an extractor from configuration
    ///
    /// An explicit `extraction.extractor_path` wins over PATH discovery.
    pub fn from_config(config: &Config) -> Option<Self> {
        let binary_path = match &config.extraction.extractor_path {
            Some(path) => path.is_file().then(|| path.clone())?,
            None => which::which(DEFAULT_EXTRACTOR_BIN).ok()?,
        };
        Some(Self::new(
            binary_path,
            config.extraction.audio_bitrate.clone(),
        ))
    }

    fn build_args(&self, request: &ExtractionRequest) -> Vec<String> {
        // yt-dlp substitutes the actual container extension for %(ext)s,
        // so the produced file keeps the job-scoped prefix
        let output_template = format!("{}.%(ext)s", request.output_base.display());

        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            "-o".to_string(),
            output_template,
        ];

        match request.format {
            MediaFormat::Audio => {
                args.push("-f".to_string());
                args.push("bestaudio/best".to_string());
                args.push("-x".to_string());
                args.push("--audio-format".to_string());
                args.push("mp3".to_string());
                args.push("--audio-quality".to_string());
                args.push(self.audio_bitrate.clone());
            }
            MediaFormat::Video => {
                args.push("-f".to_string());
                args.push("bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best".to_string());
            }
        }

        if let Some(proxy) = &request.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args.push(request.url.clone());
        args
    }
}

#[async_trait]
impl MediaExtractor for CliExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> crate::Result<()> {
        let args = self.build_args(request);
        debug!(binary = %self.binary_path.display(), ?args, "invoking extractor");

        let output = Command::new(&self.binary_path)
            .args(&args)
            .output()
            .await
            .map_err(|e| {
                crate::Error::ExternalTool(format!("Failed to execute yt-dlp: {}", e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // The last stderr line usually carries the actual cause
            let reason = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("extractor exited with a failure status")
                .to_string();
            return Err(JobError::Extraction { reason }.into());
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }
}
