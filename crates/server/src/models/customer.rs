//! Customer domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use customer_registry_core::{CustomerId, Email, NationalId, age_on};

/// A persisted customer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// Server-assigned ID.
    pub id: CustomerId,
    /// Checksum-valid national identifier, unique across customers.
    pub identifier: NationalId,
    /// Full name.
    pub name: String,
    /// Date of birth, always in the past when written.
    pub birth_date: NaiveDate,
    /// Contact address, unique across customers.
    pub email: Email,
    /// When the record was first persisted. Never changes.
    pub created_at: DateTime<Utc>,
}

/// A customer that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub identifier: NationalId,
    pub name: String,
    pub birth_date: NaiveDate,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

impl NewCustomer {
    /// Attach the ID assigned by the store.
    #[must_use]
    pub fn with_id(self, id: CustomerId) -> Customer {
        Customer {
            id,
            identifier: self.identifier,
            name: self.name,
            birth_date: self.birth_date,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

/// Field values for creating or replacing a customer.
///
/// Produced by the request validation pass. The identifier is kept as text
/// because the service checks it again before any lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInput {
    pub identifier: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub email: Email,
}

/// Outward representation of a customer, with its age at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerView {
    pub id: CustomerId,
    pub identifier: NationalId,
    pub name: String,
    pub birth_date: NaiveDate,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub age: u32,
}

impl CustomerView {
    /// Build the view of `customer` as seen on `today`.
    #[must_use]
    pub fn from_customer(customer: &Customer, today: NaiveDate) -> Self {
        Self {
            id: customer.id,
            identifier: customer.identifier.clone(),
            name: customer.name.clone(),
            birth_date: customer.birth_date,
            email: customer.email.clone(),
            created_at: customer.created_at,
            age: age_on(customer.birth_date, today),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_view_serializes_with_age() {
        let customer = Customer {
            id: CustomerId::new(7),
            identifier: NationalId::parse("68691814039").unwrap(),
            name: "Ana Souza".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            email: Email::parse("ana@example.com").unwrap(),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };

        let view = CustomerView::from_customer(&customer, NaiveDate::from_ymd_opt(2024, 6, 14).unwrap());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["identifier"], "68691814039");
        assert_eq!(json["birth_date"], "1990-06-15");
        assert_eq!(json["email"], "ana@example.com");
        assert_eq!(json["age"], 33);
    }
}
