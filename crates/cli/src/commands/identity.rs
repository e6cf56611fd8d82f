//! Identity management commands.
//!
//! # Usage
//!
//! ```bash
//! # Secret read from the environment
//! REGISTRY_IDENTITY_SECRET=... registry-cli identity register --handle operator
//!
//! # Secret read from the first line of stdin
//! echo "$SECRET" | registry-cli identity register --handle operator
//! ```

use std::io::BufRead;

use secrecy::{ExposeSecret, SecretString};

use customer_registry_server::config::database_url_from_env;
use customer_registry_server::db::{self, PgIdentityRepository};
use customer_registry_server::routes::auth::{HANDLE_MAX, HANDLE_MIN, SECRET_MAX, SECRET_MIN};
use customer_registry_server::services::auth::{Argon2Hasher, register_identity};
use customer_registry_server::validation::{length_between, required_text};

use super::CommandError;

const SECRET_ENV: &str = "REGISTRY_IDENTITY_SECRET";

/// Register a login identity directly against the database.
///
/// Applies the same handle and secret rules as the HTTP registration route.
///
/// # Errors
///
/// Returns `CommandError::Invalid` if the handle or secret breaks a rule and
/// `CommandError::Auth` if the handle is taken.
pub async fn register(handle: &str) -> Result<(), CommandError> {
    let handle = required_text(Some(handle.to_owned()))
        .and_then(|handle| length_between(handle, HANDLE_MIN, HANDLE_MAX))
        .map_err(|message| CommandError::Invalid {
            field: "handle",
            message,
        })?;

    let secret = read_secret()?;
    if secret.expose_secret().trim().is_empty() {
        return Err(CommandError::Invalid {
            field: "secret",
            message: "must not be blank".to_owned(),
        });
    }
    let secret = length_between(secret.expose_secret().to_owned(), SECRET_MIN, SECRET_MAX)
        .map(SecretString::from)
        .map_err(|message| CommandError::Invalid {
            field: "secret",
            message,
        })?;

    let pool = db::create_pool(&database_url_from_env()?).await?;
    let identities = PgIdentityRepository::new(pool);
    let hasher = Argon2Hasher::new()?;

    let handle = register_identity(&identities, &hasher, &handle, secret.expose_secret()).await?;
    tracing::info!(%handle, "Identity created");
    Ok(())
}

/// Secret from `REGISTRY_IDENTITY_SECRET`, else the first line of stdin.
fn read_secret() -> Result<SecretString, CommandError> {
    if let Ok(secret) = std::env::var(SECRET_ENV) {
        return Ok(SecretString::from(secret));
    }

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let secret = line.trim_end_matches(['\r', '\n']).to_owned();
    Ok(SecretString::from(secret))
}
