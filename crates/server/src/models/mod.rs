//! Domain models for the registry.
//!
//! These types represent validated domain objects separate from database row
//! types and from the JSON request bodies in [`crate::routes`].

pub mod customer;
pub mod identity;

pub use customer::{Customer, CustomerInput, CustomerView, NewCustomer};
pub use identity::{Identity, NewIdentity};
