//! Core types for the customer registry.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod clock;
pub mod email;
pub mod id;
pub mod national_id;
pub mod page;

pub use clock::{Clock, FixedClock, SystemClock, age_on};
pub use email::{Email, EmailError};
pub use id::*;
pub use national_id::{NationalId, NationalIdError};
pub use page::{Page, PageRequest, PageRequestError, Sort, SortDirection, SortField};
