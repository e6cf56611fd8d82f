//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                - Liveness check
//! GET    /health/ready                          - Database readiness check
//!
//! # Auth (public)
//! POST   /api/auth/register                     - Register an identity
//! POST   /api/auth/login                        - Exchange credentials for a bearer token
//!
//! # Customers (bearer token required)
//! POST   /api/customers                         - Create customer
//! GET    /api/customers                         - List customers (paged)
//! GET    /api/customers/search?name=            - Search customers by name (paged)
//! GET    /api/customers/identifier/{identifier} - Get customer by national identifier
//! GET    /api/customers/{id}                    - Get customer by ID
//! PUT    /api/customers/{id}                    - Replace customer fields
//! DELETE /api/customers/{id}                    - Delete customer
//! ```

pub mod auth;
pub mod customers;

use axum::{
    Router,
    extract::State,
    http::{Request, Response, StatusCode},
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Build the full application router with tracing and request IDs.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(auth::routes())
        .merge(customers::routes())
        .fallback(not_found)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: std::time::Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let Some(pool) = state.pool() else {
        return StatusCode::OK;
    };

    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Unknown routes answer with the envelope rather than an empty body.
async fn not_found() -> impl IntoResponse {
    ApiResponse::<()>::error("NOT_FOUND", "Resource not found.", None)
        .with_status(StatusCode::NOT_FOUND)
}
