//! Request/response dispatch to the response orchestrator.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use mar_chat::ResponseOrchestrator;
use mar_core::config::ClientConfig;
use mar_core::{ChatErrorBody, ChatReplyBody, ChatRequest};

use crate::error::ClientError;

/// Sends one utterance to the orchestrator and returns its reply.
#[async_trait::async_trait]
pub trait OrchestratorTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReplyBody, ClientError>;
}

fn validate(body: ChatReplyBody) -> Result<ChatReplyBody, ClientError> {
    if body.message.is_empty() {
        return Err(ClientError::InvalidReply("empty message".to_string()));
    }
    Ok(body)
}

/// JSON over HTTP to `POST {server_url}/api/chat`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/chat", config.server_url.trim_end_matches('/')),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl OrchestratorTransport for HttpTransport {
    #[instrument(skip(self, request), fields(endpoint = %self.endpoint, language = %request.language_code))]
    async fn send(&self, request: &ChatRequest) -> Result<ChatReplyBody, ClientError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::from_transport(&e, self.timeout))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::from_transport(&e, self.timeout))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ChatErrorBody>(&bytes)
                .map(|b| b.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(ClientError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let body: ChatReplyBody = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::InvalidReply(e.to_string()))?;
        debug!(has_image = body.image.is_some(), "Reply received");
        validate(body)
    }
}

/// Calls an in-process orchestrator, mirroring the HTTP error mapping.
#[derive(Clone)]
pub struct LocalTransport {
    orchestrator: Arc<ResponseOrchestrator>,
}

impl LocalTransport {
    pub fn new(orchestrator: Arc<ResponseOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait::async_trait]
impl OrchestratorTransport for LocalTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReplyBody, ClientError> {
        let reply = self
            .orchestrator
            .respond(&request.message, &request.language, &request.language_code)
            .await;
        if reply.is_failure() {
            return Err(ClientError::Status {
                code: 500,
                message: reply.message,
            });
        }
        validate(reply.into_body())
    }
}
