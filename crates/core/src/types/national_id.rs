//! National identifier with two trailing check digits.
//!
//! Every customer carries an 11-digit identifier whose last two digits are
//! derived from the preceding ones by a weighted modulus-11 sum. The
//! [`NationalId`] newtype can only be built from an identifier that passes
//! the checksum, so stores and services never see a malformed one.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Number of digits in a national identifier.
pub const LENGTH: usize = 11;

/// Errors that can occur when parsing a [`NationalId`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NationalIdError {
    /// The input is not exactly 11 characters long.
    #[error("identifier must have exactly {LENGTH} digits")]
    WrongLength,
    /// The input contains a character that is not an ASCII digit.
    #[error("identifier must contain only digits")]
    NonDigit,
    /// All 11 digits are the same.
    #[error("identifier cannot repeat a single digit")]
    RepeatedDigits,
    /// The check digits do not match the computed ones.
    #[error("identifier check digits do not match")]
    ChecksumMismatch,
}

/// A checksum-valid 11-digit national identifier.
///
/// ```
/// use customer_registry_core::NationalId;
///
/// assert!(NationalId::is_valid("68691814039"));
/// assert!(!NationalId::is_valid("12345678900"));
/// assert!(!NationalId::is_valid("11111111111"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NationalId(String);

impl NationalId {
    /// Parse and validate an identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`NationalIdError`] describing the first rule the input breaks.
    pub fn parse(s: &str) -> Result<Self, NationalIdError> {
        let digits = digits(s)?;

        if digits.iter().all(|&d| Some(&d) == digits.first()) {
            return Err(NationalIdError::RepeatedDigits);
        }

        let [body @ .., first, second] = digits;
        let expected_first = check_digit(&body, 10);

        let with_first: Vec<u32> = body.iter().copied().chain([expected_first]).collect();
        let expected_second = check_digit(&with_first, 11);

        if first != expected_first || second != expected_second {
            return Err(NationalIdError::ChecksumMismatch);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns `true` if the candidate passes every identifier rule.
    #[must_use]
    pub fn is_valid(candidate: &str) -> bool {
        Self::parse(candidate).is_ok()
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Split the input into exactly [`LENGTH`] decimal digits.
fn digits(s: &str) -> Result<[u32; LENGTH], NationalIdError> {
    if s.chars().count() != LENGTH {
        return Err(NationalIdError::WrongLength);
    }

    let mut out = [0_u32; LENGTH];
    for (slot, c) in out.iter_mut().zip(s.chars()) {
        if !c.is_ascii_digit() {
            return Err(NationalIdError::NonDigit);
        }
        *slot = c.to_digit(10).ok_or(NationalIdError::NonDigit)?;
    }
    Ok(out)
}

/// Weighted modulus-11 check digit.
///
/// Weights start at `first_weight` and decrease by one per digit. A result of
/// 10 or 11 is folded to 0.
fn check_digit(digits: &[u32], first_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip((2..=first_weight).rev())
        .map(|(d, w)| d * w)
        .sum();
    let digit = 11 - (sum % 11);
    if digit >= 10 { 0 } else { digit }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for NationalId {
    type Err = NationalIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NationalId {
    type Error = NationalIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NationalId> for String {
    fn from(id: NationalId) -> Self {
        id.0
    }
}

impl AsRef<str> for NationalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
