//! Fixed-window request limiter middleware.
//!
//! Counts requests in the current wall-clock second and rejects the rest
//! with 429 once the configured ceiling is reached.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Extension, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

#[derive(Clone, Debug)]
pub struct RateLimiter {
    max_per_sec: u64,
    count: Arc<AtomicU64>,
    window: Arc<AtomicU64>,
}

impl RateLimiter {
    /// Allow `max_per_sec` requests per second. Zero disables the limit.
    pub fn new(max_per_sec: u64) -> Self {
        Self {
            max_per_sec,
            count: Arc::new(AtomicU64::new(0)),
            window: Arc::new(AtomicU64::new(0)),
        }
    }

    fn try_acquire(&self) -> bool {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.try_acquire_at(now)
    }

    fn try_acquire_at(&self, now: u64) -> bool {
        if self.max_per_sec == 0 {
            return true;
        }

        // The window only moves forward; a late reading counts against the current one.
        let current = self.window.load(Ordering::Acquire);
        if now > current
            && self
                .window
                .compare_exchange(current, now, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            self.count.store(1, Ordering::Release);
            return true;
        }

        self.count.fetch_add(1, Ordering::AcqRel) < self.max_per_sec
    }
}

/// Axum middleware enforcing the limit.
pub async fn rate_limit_middleware(
    Extension(limiter): Extension<RateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    if limiter.try_acquire() {
        next.run(req).await
    } else {
        tracing::warn!(path = %req.uri().path(), "Rate limit exceeded");
        ApiError::TooManyRequests.into_response()
    }
}
