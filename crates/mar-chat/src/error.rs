//! Error types for response orchestration.

/// Errors raised inside the orchestrator pipeline.
///
/// None of these reach the end user: the orchestrator converts them into
/// the fixed apology reply or drops the optional field they affect.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("provider not configured: {0}")]
    NotConfigured(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout after {0}ms")]
    Timeout(u64),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("malformed structured output: {0}")]
    StructuredOutput(String),
    #[error("image search error: {0}")]
    ImageSearch(String),
}

impl ChatError {
    /// Classify a transport error from `reqwest`.
    pub fn from_transport(err: &reqwest::Error, timeout: std::time::Duration) -> Self {
        if err.is_timeout() {
            ChatError::Timeout(timeout.as_millis() as u64)
        } else {
            ChatError::Network(err.to_string())
        }
    }
}
