//! Application state for the API server

use crate::config::Config;
use crate::job::JobRunner;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone) and provides
/// access to the job runner (which carries the storage area and status
/// store) and the configuration.
#[derive(Clone)]
pub struct AppState {
    /// The job runner driving background downloads
    pub runner: JobRunner,

    /// Configuration (read access only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(runner: JobRunner, config: Arc<Config>) -> Self {
        Self { runner, config }
    }
}
