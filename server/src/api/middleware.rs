//! HTTP middleware (404 handler)

use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::core::constants::DEFAULT_BODY_LIMIT;

/// Handle 404 Not Found, logging the request at debug level
pub async fn handle_404(req: Request) -> impl IntoResponse {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return StatusCode::NOT_FOUND;
    }

    let method = req.method().clone();
    let uri = req.uri().clone();

    let body = match to_bytes(req.into_body(), DEFAULT_BODY_LIMIT).await {
        Ok(bytes) if bytes.is_empty() => serde_json::Value::Null,
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        }),
        Err(_) => {
            tracing::debug!("[404] {} {} (failed to read body)", method, uri);
            return StatusCode::NOT_FOUND;
        }
    };

    tracing::debug!(method = %method, url = %uri, body = %body, "[404]");
    StatusCode::NOT_FOUND
}
