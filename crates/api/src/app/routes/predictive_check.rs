use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use upkeep_core::EventSource;

use crate::app::services::AppServices;
use crate::app::{dto, errors, routes};

pub async fn predictive_check(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::PredictiveCheckRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match payload {
        Ok(b) => b,
        Err(r) => return errors::rejection_to_response(r),
    };

    let job = match body.into_job(Utc::now) {
        Ok(j) => j,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let asset_id = job.asset_id.clone();
    let evaluated_at = job.now;

    // Classification failures come back as a declined decision, not an error.
    let decision = match services.evaluate(job).await {
        Ok(d) => d,
        Err(e) => return errors::evaluation_failed(e),
    };

    routes::log_proposal(asset_id, EventSource::Predictive, &decision, evaluated_at);
    (StatusCode::OK, Json(decision)).into_response()
}
