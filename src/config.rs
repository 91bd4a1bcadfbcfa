//! Configuration types for media-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use utoipa::ToSchema;

/// Storage area configuration (shared temp directory and retention)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StorageConfig {
    /// Directory holding in-flight and completed job files (default: "./downloads")
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,

    /// Retention window in seconds before the janitor reclaims a file (default: 3600)
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
}

impl StorageConfig {
    /// The retention window as a [`Duration`]
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            retention_secs: default_retention_secs(),
        }
    }
}

/// External extraction/transcoding tool configuration
///
/// Used as a nested sub-config within [`Config`]. Explicit paths override
/// PATH discovery; the binary names are used for `which` lookups otherwise.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ExtractionConfig {
    /// Path to the extractor binary (auto-detected as "yt-dlp" if None)
    #[serde(default)]
    pub extractor_path: Option<PathBuf>,

    /// Path to the transcoder binary (auto-detected as "ffmpeg" if None)
    #[serde(default)]
    pub transcoder_path: Option<PathBuf>,

    /// Audio bitrate passed to the transcoding post-step (default: "192K")
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Optional egress proxy URL handed to the extractor verbatim
    #[serde(default)]
    pub proxy: Option<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            extractor_path: None,
            transcoder_path: None,
            audio_bitrate: default_audio_bitrate(),
            proxy: None,
        }
    }
}

/// API server configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Bind address for the HTTP server (default: 127.0.0.1:8000)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS middleware (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins; "*" or empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Serve interactive Swagger UI documentation at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            swagger_ui: true,
        }
    }
}

/// Main configuration for media-dl
///
/// Fields are organized into logical sub-configs:
/// - [`storage`](StorageConfig) — shared directory and retention window
/// - [`extraction`](ExtractionConfig) — external tool paths and options
/// - [`api`](ApiConfig) — HTTP server settings
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Storage area settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// External tool settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// HTTP API settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Parse a configuration from a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Config = toml::from_str(input).map_err(|e| Error::Config {
            message: format!("invalid TOML: {}", e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants
    pub fn validate(&self) -> Result<()> {
        if self.storage.dir.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "storage directory must not be empty".to_string(),
                key: Some("storage.dir".to_string()),
            });
        }
        if self.storage.retention_secs == 0 {
            return Err(Error::Config {
                message: "retention window must be at least one second".to_string(),
                key: Some("storage.retention_secs".to_string()),
            });
        }
        Ok(())
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_retention_secs() -> u64 {
    3600
}

fn default_audio_bitrate() -> String {
    "192K".to_string()
}

fn default_bind_address() -> SocketAddr {
    // Serde default only; the literal always parses
    #[allow(clippy::unwrap_used)]
    "127.0.0.1:8000".parse().unwrap()
}

fn default_true() -> bool {
    true
}
