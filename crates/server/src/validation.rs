//! Field validation for request bodies.
//!
//! Request DTOs implement [`Validate`], turning loosely typed JSON into the
//! typed inputs the services take. Every failing field is collected into one
//! [`ValidationErrors`] map so a client can highlight all of them at once.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use customer_registry_core::Clock;

/// Letters (including Latin-1 accented ones) in words separated by single spaces.
static PERSON_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-zÀ-ú]+( [A-Za-zÀ-ú]+)*$").expect("Invalid regex"));

/// Map of field name to the first problem found with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Create an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem with `field`. Later problems with the same field are ignored.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_insert_with(|| message.into());
    }

    /// Whether no problem was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Message recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Record the result of a field check and pass its value on.
    pub fn check<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field} {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// A request body that can be checked and converted into a typed input.
pub trait Validate {
    /// The typed value produced when every field is valid.
    type Output;

    /// Check every field, collecting all problems.
    ///
    /// # Errors
    ///
    /// Returns the map of failing fields.
    fn validate(self, clock: &dyn Clock) -> Result<Self::Output, ValidationErrors>;
}

// =============================================================================
// Field Rules
// =============================================================================

/// Trimmed, non-blank text.
///
/// # Errors
///
/// Returns a message if the value is missing or blank.
pub fn required_text(value: Option<String>) -> Result<String, String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
        _ => Err("must not be blank".to_owned()),
    }
}

/// Character count within `min..=max`.
///
/// # Errors
///
/// Returns a message if the length is out of range.
pub fn length_between(value: String, min: usize, max: usize) -> Result<String, String> {
    let len = value.chars().count();
    if (min..=max).contains(&len) {
        Ok(value)
    } else {
        Err(format!("must be between {min} and {max} characters"))
    }
}

/// A person's name: 2 to 100 letters in single-space separated words.
///
/// # Errors
///
/// Returns a message describing the first rule the name breaks.
pub fn person_name(value: Option<String>) -> Result<String, String> {
    let name = length_between(required_text(value)?, 2, 100)?;
    if PERSON_NAME_RE.is_match(&name) {
        Ok(name)
    } else {
        Err("must contain only letters, with single spaces between words".to_owned())
    }
}

/// An ISO-8601 calendar date strictly before `today`.
///
/// # Errors
///
/// Returns a message if the date is missing, malformed or not in the past.
pub fn past_date(value: Option<String>, today: NaiveDate) -> Result<NaiveDate, String> {
    let raw = value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| "must not be null".to_owned())?;
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| "must be a date in YYYY-MM-DD format".to_owned())?;

    if date < today {
        Ok(date)
    } else {
        Err("must be a date in the past".to_owned())
    }
}
