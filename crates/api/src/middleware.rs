use axum::{
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, info, info_span};

use upkeep_core::EvaluationId;

/// Correlation header, echoed on every response.
pub const EVALUATION_ID_HEADER: &str = "x-evaluation-id";

/// Assign each request an evaluation id and run it inside a span carrying it.
///
/// A caller-supplied UUID in `x-evaluation-id` is kept; anything else is
/// replaced with a fresh UUIDv7.
pub async fn evaluation_id_middleware(
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let id = extract_evaluation_id(req.headers()).unwrap_or_default();

    let span = info_span!(
        "request",
        evaluation_id = %id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut res = next.run(req).instrument(span.clone()).await;
    span.in_scope(|| info!(status = res.status().as_u16(), "request finished"));

    if let Ok(v) = HeaderValue::from_str(&id.to_string()) {
        res.headers_mut().insert(EVALUATION_ID_HEADER, v);
    }
    res
}

fn extract_evaluation_id(headers: &HeaderMap) -> Option<EvaluationId> {
    headers
        .get(EVALUATION_ID_HEADER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
