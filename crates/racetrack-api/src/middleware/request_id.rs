//! Request ID assignment and the per-request tracing span.
//!
//! `inject_request_id` runs outermost: it tags the request with an ID and
//! echoes it in the `X-Request-Id` response header. `request_span` builds the
//! span `TraceLayer` opens for each request, so every log line emitted while
//! handling the request carries the same ID.

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{info_span, Span};
use uuid::Uuid;

/// Response header carrying the request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID stored in request extensions for downstream layers.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Tags the request with a fresh ID and returns it in the response header.
pub async fn inject_request_id(mut req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    req.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(req).await;

    if let Ok(header_value) = request_id.parse() {
        response.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    response
}

/// Span for one HTTP request, labelled with the ID assigned by
/// [`inject_request_id`].
pub fn request_span(req: &Request) -> Span {
    let request_id = req.extensions().get::<RequestId>().map_or("-", |id| id.0.as_str());

    info_span!(
        "http_request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id,
    )
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn header_matches_id_seen_by_inner_layers() {
        let app = Router::new()
            .route("/", get(|Extension(id): Extension<RequestId>| async move { id.0 }))
            .layer(middleware::from_fn(inject_request_id));

        let response =
            app.oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()).await.unwrap();

        let header = response.headers()[REQUEST_ID_HEADER].to_str().unwrap().to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(std::str::from_utf8(&body).unwrap(), header);
        assert!(Uuid::parse_str(&header).is_ok());
    }
}
