//! Customer Registry Core - Shared domain types.
//!
//! This crate provides the types used across all registry components:
//! - `server` - HTTP API for customer records and identities
//! - `cli` - Command-line tools for migrations and identity management
//!
//! # Architecture
//!
//! The core crate contains only types, pure validation and traits - no I/O,
//! no database access, no HTTP. Everything here can be unit tested without a
//! runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, national identifiers, pagination and clocks

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
