//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use customer_registry_core::{Clock, SystemClock};

use crate::config::JwtConfig;
use crate::db::{
    CustomerStore, IdentityStore, MemoryCustomerStore, MemoryIdentityStore, PgCustomerRepository,
    PgIdentityRepository,
};
use crate::services::auth::{
    Argon2Hasher, AuthError, AuthService, JwtIssuer, SecretHasher, TokenIssuer,
};
use crate::services::customers::CustomerService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// stores, the secret hasher, the token issuer and the clock.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    customers: Box<dyn CustomerStore>,
    identities: Box<dyn IdentityStore>,
    hasher: Box<dyn SecretHasher>,
    tokens: Box<dyn TokenIssuer>,
    clock: Box<dyn Clock>,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create application state from explicit collaborators.
    pub fn new(
        customers: impl CustomerStore + 'static,
        identities: impl IdentityStore + 'static,
        hasher: impl SecretHasher + 'static,
        tokens: impl TokenIssuer + 'static,
        clock: impl Clock + 'static,
    ) -> Self {
        Self::build(
            Box::new(customers),
            Box::new(identities),
            Box::new(hasher),
            Box::new(tokens),
            Box::new(clock),
            None,
        )
    }

    /// Create application state backed by `PostgreSQL`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the hasher cannot be initialized.
    pub fn postgres(pool: PgPool, jwt: &JwtConfig) -> Result<Self, AuthError> {
        Ok(Self::build(
            Box::new(PgCustomerRepository::new(pool.clone())),
            Box::new(PgIdentityRepository::new(pool.clone())),
            Box::new(Argon2Hasher::new()?),
            Box::new(JwtIssuer::new(jwt)),
            Box::new(SystemClock),
            Some(pool),
        ))
    }

    /// Create application state backed by empty in-memory stores.
    #[must_use]
    pub fn in_memory(hasher: Argon2Hasher, jwt: &JwtConfig, clock: impl Clock + 'static) -> Self {
        Self::new(
            MemoryCustomerStore::new(),
            MemoryIdentityStore::new(),
            hasher,
            JwtIssuer::new(jwt),
            clock,
        )
    }

    fn build(
        customers: Box<dyn CustomerStore>,
        identities: Box<dyn IdentityStore>,
        hasher: Box<dyn SecretHasher>,
        tokens: Box<dyn TokenIssuer>,
        clock: Box<dyn Clock>,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                customers,
                identities,
                hasher,
                tokens,
                clock,
                pool,
            }),
        }
    }

    /// Get a reference to the database connection pool, if the stores use one.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Get a reference to the token issuer.
    #[must_use]
    pub fn tokens(&self) -> &dyn TokenIssuer {
        self.inner.tokens.as_ref()
    }

    /// Get a reference to the clock.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    /// Customer service bound to this state.
    #[must_use]
    pub fn customer_service(&self) -> CustomerService<'_> {
        CustomerService::new(self.inner.customers.as_ref(), self.inner.clock.as_ref())
    }

    /// Authentication service bound to this state.
    #[must_use]
    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(
            self.inner.identities.as_ref(),
            self.inner.hasher.as_ref(),
            self.inner.tokens.as_ref(),
        )
    }
}
