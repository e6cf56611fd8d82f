//! Login identity types.
//!
//! Identities are append-only. `Identity` has no `Serialize` implementation,
//! so the secret hash never reaches a response body.

use customer_registry_core::IdentityId;

/// A registered login identity.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    /// Server-assigned ID.
    pub id: IdentityId,
    /// Unique login handle.
    pub handle: String,
    /// Argon2 PHC string of the secret.
    pub secret_hash: String,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("handle", &self.handle)
            .field("secret_hash", &"[REDACTED]")
            .finish()
    }
}

/// An identity that has not been persisted yet.
#[derive(Clone, PartialEq, Eq)]
pub struct NewIdentity {
    pub handle: String,
    pub secret_hash: String,
}

impl NewIdentity {
    /// Attach the ID assigned by the store.
    #[must_use]
    pub fn with_id(self, id: IdentityId) -> Identity {
        Identity {
            id,
            handle: self.handle,
            secret_hash: self.secret_hash,
        }
    }
}

impl std::fmt::Debug for NewIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewIdentity")
            .field("handle", &self.handle)
            .field("secret_hash", &"[REDACTED]")
            .finish()
    }
}
