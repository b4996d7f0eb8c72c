use axum::{
    body::{Body, to_bytes},
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::error;

/// Logs every 5xx response body before passing it on unchanged, so upstream
/// failures are visible server-side even though clients only get the generic
/// detail.
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    if response.status().is_server_error() {
        let (mut parts, body) = response.into_parts();
        let bytes = match to_bytes(body, 1024).await {
            Ok(b) => b,
            Err(e) => {
                error!("failed to read error response body: {}", e);
                return Response::from_parts(parts, Body::empty());
            }
        };

        error!(
            "{} {} failed with {}: {}",
            method,
            uri,
            parts.status,
            String::from_utf8_lossy(&bytes)
        );

        // Rebuild the body so the client still receives it.
        parts.headers.remove(axum::http::header::CONTENT_LENGTH);
        Response::from_parts(parts, Body::from(bytes))
    } else {
        response
    }
}
