//! Request accounting.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::observability::metrics;

/// Count every routed request by route template and final status.
///
/// Installed as a route layer so the matched path is known and extractor
/// rejections (malformed JSON, oversized bodies) are counted too.
pub async fn record_metrics(req: Request<Body>, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(req).await;
    metrics::record_request(route, response.status().as_u16());
    response
}
