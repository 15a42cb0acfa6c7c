use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use upkeep_core::DomainError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Malformed JSON, wrong content type or wrong field types.
pub fn rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_payload", rejection.body_text())
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", err.to_string())
}

pub fn evaluation_failed(err: tokio::task::JoinError) -> axum::response::Response {
    tracing::error!(error = %err, "evaluation task failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "evaluation_failed",
        "evaluation did not complete",
    )
}
