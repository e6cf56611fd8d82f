//! Offline customer helpers.
//!
//! # Usage
//!
//! ```bash
//! registry-cli customer check-identifier 52998224725
//! ```

use customer_registry_core::NationalId;

use super::CommandError;

/// Check a national identifier without touching the database.
///
/// # Errors
///
/// Returns `CommandError::Invalid` with the reason the identifier was rejected.
pub fn check_identifier(raw: &str) -> Result<NationalId, CommandError> {
    let id = NationalId::parse(raw.trim()).map_err(|e| CommandError::Invalid {
        field: "identifier",
        message: e.to_string(),
    })?;

    tracing::info!(identifier = %id.as_str(), "Identifier is valid");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_identifier() {
        assert!(check_identifier("52998224725").is_ok());
        assert!(check_identifier(" 11144477735 ").is_ok());
        assert!(matches!(
            check_identifier("12345678900"),
            Err(CommandError::Invalid { field: "identifier", .. })
        ));
    }
}
