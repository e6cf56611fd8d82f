//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. `TraceLayer` (request span with method, URI, status and latency)
//! 3. Request ID (recorded on the request span)
//!
//! Bearer authentication is an extractor rather than a layer, so public
//! routes simply do not ask for it.

pub mod auth;
pub mod request_id;

pub use auth::RequireBearer;
pub use request_id::request_id_middleware;
