//! API error type and its JSON rendering.
//!
//! Every error response uses the same `{ "error": message }` body the chat
//! client already understands.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use mar_chat::ChatError;
use mar_core::{ChatErrorBody, SERVER_APOLOGY};

#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request: missing or invalid input.
    BadRequest(String),
    /// Request body rejected before reaching the handler (size, content type).
    Rejected(StatusCode, String),
    /// 429 Too Many Requests.
    TooManyRequests,
    /// 500 Internal Server Error; the message is shown to the user.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected(status, _) => *status,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            ApiError::BadRequest(msg) | ApiError::Rejected(_, msg) | ApiError::Internal(msg) => msg,
            ApiError::TooManyRequests => "Rate limit exceeded".to_string(),
        };
        (status, Json(ChatErrorBody { error })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNSUPPORTED_MEDIA_TYPE => {
                ApiError::Rejected(rejection.status(), rejection.body_text())
            }
            _ => ApiError::BadRequest(rejection.body_text()),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => ApiError::BadRequest(err.to_string()),
            _ => ApiError::Internal(SERVER_APOLOGY.to_string()),
        }
    }
}
