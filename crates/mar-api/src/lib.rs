//! MAR API crate: axum HTTP server exposing the response orchestrator.
//!
//! `POST /api/chat` runs one orchestrator turn; `GET /health` reports
//! liveness and the serving model.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
