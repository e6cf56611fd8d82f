//! Customer Registry Server library.
//!
//! The HTTP API lives here as a library so the binary, the CLI and the
//! integration tests all build the same router and state.
//!
//! # Modules
//!
//! - [`routes`] - Axum router and handlers
//! - [`services`] - Customer and authentication operations
//! - [`db`] - `PostgreSQL` and in-memory stores
//! - [`state`] - Shared application state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

pub use routes::router;
pub use state::AppState;
