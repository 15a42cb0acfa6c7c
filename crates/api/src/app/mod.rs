//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: classifier worker and evaluation dispatch
//! - `routes/`: HTTP routes + handlers (one file per evaluation path)
//! - `dto.rs`: request/response DTOs and boundary validation
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: AppServices) -> Router {
    let services = Arc::new(services);

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::evaluation_id_middleware)),
        )
}
