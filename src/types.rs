//! Core types for media-dl

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Length of generated job id tokens
const JOB_ID_LEN: usize = 8;

/// Maximum accepted length for a client-supplied job id
const MAX_KEY_LEN: usize = 20;

/// Opaque unique identifier for a job
///
/// Generated once at job creation and used as the correlation key for every
/// artifact belonging to the job: its status record, its temporary extractor
/// output, and its finalized file.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generate a fresh random 8-character alphanumeric id
    pub fn generate() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(JOB_ID_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether a client-supplied key is acceptable as a job id
    ///
    /// Keys longer than 20 characters, empty keys, or keys containing
    /// anything but ASCII alphanumerics are rejected before any storage
    /// lookup happens. This also rules out `..` and path separators.
    ///
    /// Issued ids are always short alphanumeric tokens, so the
    /// alphanumeric-only rule is tighter than the length and `..` checks
    /// alone: a key that could never have been issued gets 400 rather than
    /// reading as a pending job.
    pub fn is_valid_key(key: &str) -> bool {
        !key.is_empty()
            && key.len() <= MAX_KEY_LEN
            && key.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Target media kind for a job
///
/// Serialized externally as the container extension (`mp3`/`mp4`). A missing
/// or unrecognized value falls back to [`MediaFormat::Audio`] rather than
/// rejecting the request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub enum MediaFormat {
    /// Audio-only output, transcoded to mp3
    #[default]
    #[serde(rename = "mp3")]
    Audio,
    /// Video output in an mp4 container
    #[serde(rename = "mp4")]
    Video,
}

impl MediaFormat {
    /// The on-disk artifact extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Audio => "mp3",
            MediaFormat::Video => "mp4",
        }
    }

    /// Whether producing this format requires the transcoding binary
    ///
    /// Audio jobs run an ffmpeg extract-audio post-step; video jobs take the
    /// container the extractor produces as-is.
    pub fn requires_transcoder(&self) -> bool {
        matches!(self, MediaFormat::Audio)
    }

    /// Parse a client-supplied format string, defaulting to audio
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some("mp4") => MediaFormat::Video,
            _ => MediaFormat::Audio,
        }
    }
}

// Hand-rolled so that anything but the string "mp4" (unknown strings,
// null, numbers, nested values) defaults to Audio instead of failing the
// whole request body.
impl<'de> Deserialize<'de> for MediaFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(MediaFormat::parse_lenient(value.as_str()))
    }
}

/// Lifecycle state of a job
///
/// `Pending` is never persisted: it is the poller's interpretation of
/// "no status record yet". Stored records only ever hold `Downloading`,
/// `Complete`, or `Error`, and the terminal states are never left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    /// No record exists yet (synthesized by the API, never written)
    Pending,
    /// The background worker is fetching and converting the media
    Downloading,
    /// Terminal: the artifact is finalized and ready for delivery
    Complete,
    /// Terminal: the job failed
    Error,
}

impl JobState {
    /// Whether this state is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Complete | JobState::Error)
    }
}
