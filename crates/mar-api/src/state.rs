//! Application state shared across route handlers.

use std::sync::Arc;
use std::time::Instant;

use mar_chat::ResponseOrchestrator;
use mar_core::MarConfig;

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MarConfig>,
    pub orchestrator: Arc<ResponseOrchestrator>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: MarConfig, orchestrator: ResponseOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            start_time: Instant::now(),
        }
    }
}
