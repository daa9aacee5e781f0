//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Liveness response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
}

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the service is running.
/// This endpoint does NOT check the backing store.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "ok",
///   "version": "0.1.0"
/// }
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, Json(body)) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert!(!body.version.is_empty());
    }
}
