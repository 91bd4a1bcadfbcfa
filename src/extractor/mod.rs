//! External extraction and transcoding collaborators
//!
//! Media extraction is delegated entirely to an external tool (yt-dlp by
//! default), which in turn drives the transcoding binary (ffmpeg) for its
//! audio post-step. This module holds the trait boundary, the CLI-backed
//! implementation, and a stub for graceful degradation.

mod cli;
mod noop;
mod traits;

pub use cli::CliExtractor;
pub use noop::NoOpExtractor;
pub use traits::{ExtractionRequest, MediaExtractor};

use crate::config::Config;
use std::path::PathBuf;

/// Default extractor binary name searched for in PATH
pub const DEFAULT_EXTRACTOR_BIN: &str = "yt-dlp";

/// Default transcoder binary name searched for in PATH
pub const DEFAULT_TRANSCODER_BIN: &str = "ffmpeg";

/// Locate the transcoding binary, honoring a configured override
///
/// Audio jobs must not even reach the extractor when this returns `None`;
/// the executor fails them fast with a terminal error instead.
pub fn find_transcoder(config: &Config) -> Option<PathBuf> {
    match &config.extraction.transcoder_path {
        Some(path) => path.is_file().then(|| path.clone()),
        None => which::which(DEFAULT_TRANSCODER_BIN).ok(),
    }
}
