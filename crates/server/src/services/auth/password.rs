//! Secret hashing with Argon2id.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use super::AuthError;

/// Input hashed once at construction to produce the decoy hash.
const DECOY_SECRET: &str = "decoy-secret-for-unknown-handles";

/// One-way hashing of login secrets.
pub trait SecretHasher: Send + Sync {
    /// Hash a plaintext secret into a self-describing hash string.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing fails.
    fn hash(&self, secret: &str) -> Result<String, AuthError>;

    /// Check a plaintext secret against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the stored hash cannot be parsed.
    fn verify(&self, secret: &str, hash: &str) -> Result<bool, AuthError>;

    /// A well-formed hash that is verified against when a handle is unknown,
    /// so both login failure paths do the same work.
    fn decoy_hash(&self) -> &str;
}

/// Argon2id hasher.
#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
    decoy_hash: String,
}

impl std::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

impl Argon2Hasher {
    /// Create a hasher with the default Argon2id parameters.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the decoy hash cannot be computed.
    pub fn new() -> Result<Self, AuthError> {
        Self::from_argon2(Argon2::default())
    }

    /// Create a hasher with explicit cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the parameters are rejected.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, AuthError> {
        let params =
            Params::new(m_cost, t_cost, p_cost, None).map_err(|_| AuthError::PasswordHash)?;
        Self::from_argon2(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    fn from_argon2(argon2: Argon2<'static>) -> Result<Self, AuthError> {
        let decoy_hash = hash_with(&argon2, DECOY_SECRET)?;
        Ok(Self { argon2, decoy_hash })
    }
}

fn hash_with(argon2: &Argon2<'_>, secret: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

impl SecretHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> Result<String, AuthError> {
        hash_with(&self.argon2, secret)
    }

    fn verify(&self, secret: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;

        match self.argon2.verify_password(secret.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(_) => Err(AuthError::PasswordHash),
        }
    }

    fn decoy_hash(&self) -> &str {
        &self.decoy_hash
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn hasher() -> Argon2Hasher {
        Argon2Hasher::with_params(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("s3cret-value").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("s3cret-value"));
        assert!(hasher.verify("s3cret-value", &hash).unwrap());
        assert!(!hasher.verify("other-value", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = hasher();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            hasher().verify("secret", "not-a-phc-string"),
            Err(AuthError::PasswordHash)
        ));
    }

    #[test]
    fn test_decoy_hash_is_well_formed() {
        let hasher = hasher();
        assert!(!hasher.verify("anything", hasher.decoy_hash()).unwrap());
    }
}
