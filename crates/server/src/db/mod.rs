//! Persistence for customer records and identities.
//!
//! # Database
//!
//! ## Tables (schema `registry`)
//!
//! - `customers` - Customer records, unique on `identifier` and `email`
//! - `identities` - Login handles with argon2 secret hashes, unique on `handle`
//!
//! # Stores
//!
//! Services talk to storage through the [`CustomerStore`] and [`IdentityStore`]
//! traits. Two implementations exist for each:
//!
//! - `Pg*Repository` - `PostgreSQL` via sqlx
//! - `Memory*Store` - process-local maps, used by tests and local runs
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p customer-registry-cli -- migrate
//! ```

pub mod customers;
pub mod identities;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use customer_registry_core::{CustomerId, Email, NationalId, Page, PageRequest};

use crate::models::customer::{Customer, NewCustomer};
use crate::models::identity::{Identity, NewIdentity};

pub use customers::PgCustomerRepository;
pub use identities::PgIdentityRepository;
pub use memory::{MemoryCustomerStore, MemoryIdentityStore};

/// Unique constraint on `customers.identifier`.
pub const CUSTOMER_IDENTIFIER_KEY: &str = "customers_identifier_key";
/// Unique constraint on `customers.email`.
pub const CUSTOMER_EMAIL_KEY: &str = "customers_email_key";
/// Unique constraint on `identities.handle`.
pub const IDENTITY_HANDLE_KEY: &str = "identities_handle_key";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation. Carries the constraint name.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Name of the violated unique constraint, if this is a conflict.
    #[must_use]
    pub fn conflict_constraint(&self) -> Option<&str> {
        match self {
            Self::Conflict(constraint) => Some(constraint),
            _ => None,
        }
    }
}

/// Map a sqlx error to a `RepositoryError`, keeping unique violations typed.
pub(crate) fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let constraint = db_err.constraint().unwrap_or("unique").to_owned();
        return RepositoryError::Conflict(constraint);
    }
    RepositoryError::Database(e)
}

/// Storage gateway for customer records.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Fetch a customer by ID.
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    /// Fetch the customer holding `identifier`.
    async fn find_by_identifier(
        &self,
        identifier: &NationalId,
    ) -> Result<Option<Customer>, RepositoryError>;

    /// Fetch the customer holding `email`.
    async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError>;

    /// Customers whose name contains `fragment`, ignoring case.
    async fn find_by_name_containing(
        &self,
        fragment: &str,
        page: &PageRequest,
    ) -> Result<Page<Customer>, RepositoryError>;

    /// Every customer.
    async fn find_all(&self, page: &PageRequest) -> Result<Page<Customer>, RepositoryError>;

    /// Persist a new customer and return it with its assigned ID.
    ///
    /// Returns `RepositoryError::Conflict` if the identifier or email is taken.
    async fn insert(&self, customer: NewCustomer) -> Result<Customer, RepositoryError>;

    /// Overwrite the mutable fields of an existing customer.
    ///
    /// Returns `RepositoryError::NotFound` if the ID does not exist and
    /// `RepositoryError::Conflict` if the identifier or email is taken.
    async fn update(&self, customer: &Customer) -> Result<Customer, RepositoryError>;

    /// Whether a customer with this ID exists.
    async fn exists_by_id(&self, id: CustomerId) -> Result<bool, RepositoryError>;

    /// Remove a customer. Returns `false` if it did not exist.
    async fn delete_by_id(&self, id: CustomerId) -> Result<bool, RepositoryError>;
}

/// Storage gateway for login identities.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Fetch the identity registered under `handle`.
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Identity>, RepositoryError>;

    /// Persist a new identity.
    ///
    /// Returns `RepositoryError::Conflict` if the handle is taken.
    async fn insert(&self, identity: NewIdentity) -> Result<Identity, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the embedded migrations against `pool`.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
