//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Identity registration and login (argon2 hashes, bearer tokens)
//! - `customers` - Customer record lifecycle with uniqueness rules
//!
//! Services are built per request from [`crate::state::AppState`] and borrow
//! their collaborators, so they can be exercised against the in-memory stores.

pub mod auth;
pub mod customers;
