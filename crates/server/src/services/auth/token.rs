//! Bearer token issuance and verification (HS256 JWT).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::config::JwtConfig;

/// Token type reported to clients.
pub const TOKEN_TYPE: &str = "Bearer";

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims carried by every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity handle)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

/// A freshly minted token as returned from login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

/// Mints and checks bearer tokens.
pub trait TokenIssuer: Send + Sync {
    /// Mint a token for `subject`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` if encoding fails.
    fn mint(&self, subject: &str) -> Result<IssuedToken, AuthError>;

    /// Verify a token's signature, issuer and expiry and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any token that does not verify.
    fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

/// HMAC-SHA256 JWT issuer.
pub struct JwtIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    issuer: String,
}

impl std::fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIssuer")
            .field("ttl", &self.ttl)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl JwtIssuer {
    /// Create an issuer from configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();

        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::minutes(config.ttl_minutes),
            issuer: config.issuer.clone(),
        }
    }
}

impl TokenIssuer for JwtIssuer {
    fn mint(&self, subject: &str) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_owned(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(AuthError::TokenSigning)?;

        Ok(IssuedToken {
            token,
            token_type: TOKEN_TYPE,
            expires_in: self.ttl.num_seconds(),
        })
    }

    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn config(secret: &str, issuer: &str) -> JwtConfig {
        JwtConfig {
            secret: SecretString::from(secret),
            ttl_minutes: 15,
            issuer: issuer.to_owned(),
        }
    }

    #[test]
    fn test_mint_and_verify() {
        let issuer = JwtIssuer::new(&config("k3Y!9xQ#2mZ@7vL$4pW^8rT&1nB*6cF0", "registry"));
        let issued = issuer.mint("operator").unwrap();

        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 15 * 60);

        let claims = issuer.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, "operator");
        assert_eq!(claims.iss, "registry");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_rejects_foreign_and_garbled_tokens() {
        let ours = JwtIssuer::new(&config("k3Y!9xQ#2mZ@7vL$4pW^8rT&1nB*6cF0", "registry"));
        let theirs = JwtIssuer::new(&config("Zp4#Lq8!Xw2@Nm6$Rt0^Vb3&Hc7*Jd1%", "registry"));
        let other_issuer = JwtIssuer::new(&config("k3Y!9xQ#2mZ@7vL$4pW^8rT&1nB*6cF0", "elsewhere"));

        let token = theirs.mint("operator").unwrap().token;
        assert!(matches!(ours.verify(&token), Err(AuthError::InvalidToken)));

        let token = other_issuer.mint("operator").unwrap().token;
        assert!(matches!(ours.verify(&token), Err(AuthError::InvalidToken)));

        assert!(matches!(ours.verify("not.a.token"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_rejects_expired_token() {
        let secret = "k3Y!9xQ#2mZ@7vL$4pW^8rT&1nB*6cF0";
        let issuer = JwtIssuer::new(&config(secret, "registry"));

        let issued_at = Utc::now() - Duration::hours(2);
        let claims = Claims {
            sub: "operator".to_owned(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::hours(1)).timestamp(),
            iss: "registry".to_owned(),
        };
        let token = encode(
            &Header::new(JWT_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(issuer.verify(&token), Err(AuthError::InvalidToken)));
    }
}
