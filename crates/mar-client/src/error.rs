/// Errors surfaced by the conversation client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout after {0}ms")]
    Timeout(u64),
    #[error("orchestrator returned {code}: {message}")]
    Status { code: u16, message: String },
    #[error("invalid reply: {0}")]
    InvalidReply(String),
    #[error("unknown language: {0}")]
    UnknownLanguage(String),
    #[error("speech error: {0}")]
    Speech(String),
    #[error("invalid control transition: {0}")]
    InvalidTransition(String),
}

impl ClientError {
    pub fn from_transport(err: &reqwest::Error, timeout: std::time::Duration) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(timeout.as_millis() as u64)
        } else {
            ClientError::Network(err.to_string())
        }
    }
}
