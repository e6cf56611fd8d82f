//! Authentication service.
//!
//! Registers login identities and exchanges a handle and secret for a bearer
//! token. Secrets are only ever stored as Argon2id hashes and never logged.

mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use password::{Argon2Hasher, SecretHasher};
pub use token::{Claims, IssuedToken, JwtIssuer, TokenIssuer};

use tracing::instrument;

use crate::db::IdentityStore;
use crate::models::identity::{Identity, NewIdentity};

/// Checks a handle and secret against the stored identities.
pub struct Authenticator<'a> {
    identities: &'a dyn IdentityStore,
    hasher: &'a dyn SecretHasher,
}

impl<'a> Authenticator<'a> {
    /// Create a new authenticator.
    #[must_use]
    pub const fn new(identities: &'a dyn IdentityStore, hasher: &'a dyn SecretHasher) -> Self {
        Self { identities, hasher }
    }

    /// Return the identity if `secret` matches its stored hash.
    ///
    /// An unknown handle still costs one hash verification.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown handle or a wrong secret.
    pub async fn authenticate(&self, handle: &str, secret: &str) -> Result<Identity, AuthError> {
        let Some(identity) = self.identities.find_by_handle(handle).await? else {
            let _ = self.hasher.verify(secret, self.hasher.decoy_hash());
            return Err(AuthError::InvalidCredentials);
        };

        if self.hasher.verify(secret, &identity.secret_hash)? {
            Ok(identity)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Hash `secret` and store a new identity under `handle`.
///
/// The unique constraint on the handle still decides a race between two
/// registrations that both pass the lookup.
///
/// # Errors
///
/// Returns `AuthError::HandleConflict` if the handle is already registered.
/// Returns `AuthError::PasswordHash` if hashing fails.
pub async fn register_identity(
    identities: &dyn IdentityStore,
    hasher: &dyn SecretHasher,
    handle: &str,
    secret: &str,
) -> Result<String, AuthError> {
    if identities.find_by_handle(handle).await?.is_some() {
        return Err(AuthError::HandleConflict);
    }

    let secret_hash = hasher.hash(secret)?;
    let identity = identities
        .insert(NewIdentity {
            handle: handle.to_owned(),
            secret_hash,
        })
        .await?;

    tracing::info!(identity_id = %identity.id, "Identity registered");
    Ok(identity.handle)
}

/// Authentication service.
///
/// Handles identity registration and token issuance.
pub struct AuthService<'a> {
    identities: &'a dyn IdentityStore,
    hasher: &'a dyn SecretHasher,
    tokens: &'a dyn TokenIssuer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        identities: &'a dyn IdentityStore,
        hasher: &'a dyn SecretHasher,
        tokens: &'a dyn TokenIssuer,
    ) -> Self {
        Self {
            identities,
            hasher,
            tokens,
        }
    }

    /// Register a new identity and return its handle.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::HandleConflict` if the handle is already registered.
    /// Returns `AuthError::PasswordHash` if hashing fails.
    #[instrument(skip(self, secret))]
    pub async fn register(&self, handle: &str, secret: &str) -> Result<String, AuthError> {
        register_identity(self.identities, self.hasher, handle, secret).await
    }

    /// Authenticate and mint a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown handle or a wrong secret.
    /// Returns `AuthError::TokenSigning` if the token cannot be minted.
    #[instrument(skip(self, secret))]
    pub async fn login(&self, handle: &str, secret: &str) -> Result<IssuedToken, AuthError> {
        let identity = match Authenticator::new(self.identities, self.hasher)
            .authenticate(handle, secret)
            .await
        {
            Ok(identity) => identity,
            Err(err) => {
                if matches!(err, AuthError::InvalidCredentials) {
                    tracing::warn!("Login failed");
                }
                return Err(err);
            }
        };

        let issued = self.tokens.mint(&identity.handle)?;
        tracing::info!(identity_id = %identity.id, "Login succeeded");
        Ok(issued)
    }
}
