//! Customer registry service.
//!
//! Enforces the record invariants on top of a [`CustomerStore`]: every stored
//! identifier passes the checksum, and no two customers share an identifier
//! or an email. Uniqueness is checked here first so each conflict gets its
//! own error; the store's constraints catch the writes that race past it.

mod error;

pub use error::CustomerError;

use customer_registry_core::{Clock, CustomerId, NationalId, Page, PageRequest};
use tracing::instrument;

use crate::db::CustomerStore;
use crate::models::customer::{Customer, CustomerInput, CustomerView, NewCustomer};

/// Customer registry service.
pub struct CustomerService<'a> {
    store: &'a dyn CustomerStore,
    clock: &'a dyn Clock,
}

impl<'a> CustomerService<'a> {
    /// Create a new customer service.
    #[must_use]
    pub const fn new(store: &'a dyn CustomerStore, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Register a new customer.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::InvalidIdentifier` if the identifier fails the checksum.
    /// Returns `CustomerError::IdentifierConflict` or `CustomerError::EmailConflict`
    /// if another customer holds the identifier or email.
    /// Returns `CustomerError::Repository` if the store fails.
    #[instrument(skip_all)]
    pub async fn create(&self, input: CustomerInput) -> Result<CustomerView, CustomerError> {
        let identifier = NationalId::parse(&input.identifier)?;

        if self.store.find_by_identifier(&identifier).await?.is_some() {
            return Err(CustomerError::IdentifierConflict);
        }
        if self.store.find_by_email(&input.email).await?.is_some() {
            return Err(CustomerError::EmailConflict);
        }

        let customer = self
            .store
            .insert(NewCustomer {
                identifier,
                name: input.name,
                birth_date: input.birth_date,
                email: input.email,
                created_at: self.clock.now(),
            })
            .await?;

        tracing::info!(customer_id = %customer.id, "Customer created");
        Ok(self.view(&customer))
    }

    /// Replace the mutable fields of an existing customer.
    ///
    /// The ID and creation timestamp are kept. Matches on the customer's own
    /// identifier or email are not conflicts.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound` if no customer has this ID.
    /// Returns the same validation and conflict errors as [`Self::create`].
    #[instrument(skip(self, input), fields(customer_id = %id))]
    pub async fn update(
        &self,
        id: CustomerId,
        input: CustomerInput,
    ) -> Result<CustomerView, CustomerError> {
        let existing = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(CustomerError::NotFound)?;

        let identifier = NationalId::parse(&input.identifier)?;

        if let Some(holder) = self.store.find_by_identifier(&identifier).await?
            && holder.id != id
        {
            return Err(CustomerError::IdentifierConflict);
        }
        if let Some(holder) = self.store.find_by_email(&input.email).await?
            && holder.id != id
        {
            return Err(CustomerError::EmailConflict);
        }

        let customer = self
            .store
            .update(&Customer {
                id,
                identifier,
                name: input.name,
                birth_date: input.birth_date,
                email: input.email,
                created_at: existing.created_at,
            })
            .await?;

        tracing::info!("Customer updated");
        Ok(self.view(&customer))
    }

    /// Delete a customer.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound` if no customer has this ID.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn delete(&self, id: CustomerId) -> Result<(), CustomerError> {
        if !self.store.exists_by_id(id).await? {
            return Err(CustomerError::NotFound);
        }

        // A concurrent delete between the two calls is still a miss.
        if !self.store.delete_by_id(id).await? {
            return Err(CustomerError::NotFound);
        }

        tracing::info!("Customer deleted");
        Ok(())
    }

    /// Fetch a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound` if no customer has this ID.
    pub async fn get_by_id(&self, id: CustomerId) -> Result<CustomerView, CustomerError> {
        let customer = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(CustomerError::NotFound)?;
        Ok(self.view(&customer))
    }

    /// Fetch a customer by national identifier.
    ///
    /// A malformed identifier cannot match any record, so it is reported as
    /// not found.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound` if no customer holds the identifier.
    pub async fn get_by_identifier(&self, identifier: &str) -> Result<CustomerView, CustomerError> {
        let Ok(identifier) = NationalId::parse(identifier) else {
            return Err(CustomerError::NotFound);
        };

        let customer = self
            .store
            .find_by_identifier(&identifier)
            .await?
            .ok_or(CustomerError::NotFound)?;
        Ok(self.view(&customer))
    }

    /// Customers whose name contains `fragment`, ignoring case.
    ///
    /// A blank fragment lists every customer.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Repository` if the store fails.
    pub async fn list_by_name(
        &self,
        fragment: &str,
        page: &PageRequest,
    ) -> Result<Page<CustomerView>, CustomerError> {
        let fragment = fragment.trim();
        let customers = if fragment.is_empty() {
            self.store.find_all(page).await?
        } else {
            self.store.find_by_name_containing(fragment, page).await?
        };
        Ok(self.views(customers))
    }

    /// Every customer, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Repository` if the store fails.
    pub async fn list_all(&self, page: &PageRequest) -> Result<Page<CustomerView>, CustomerError> {
        let customers = self.store.find_all(page).await?;
        Ok(self.views(customers))
    }

    fn view(&self, customer: &Customer) -> CustomerView {
        CustomerView::from_customer(customer, self.clock.today())
    }

    fn views(&self, customers: Page<Customer>) -> Page<CustomerView> {
        let today = self.clock.today();
        customers.map(|c| CustomerView::from_customer(&c, today))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use customer_registry_core::{Email, FixedClock};

    use super::*;
    use crate::db::MemoryCustomerStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(identifier: &str, name: &str, email: &str) -> CustomerInput {
        CustomerInput {
            identifier: identifier.to_owned(),
            name: name.to_owned(),
            birth_date: date(1990, 6, 15),
            email: Email::parse(email).unwrap(),
        }
    }

    fn clock() -> FixedClock {
        FixedClock::on(date(2024, 6, 14))
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let store = MemoryCustomerStore::new();
        let clock = clock();
        let service = CustomerService::new(&store, &clock);

        let created = service
            .create(input("68691814039", "Ana Souza", "ana@example.com"))
            .await
            .unwrap();
        assert_eq!(created.age, 33);
        assert_eq!(created.created_at, clock.now());

        let by_id = service.get_by_id(created.id).await.unwrap();
        let by_identifier = service.get_by_identifier("68691814039").await.unwrap();
        assert_eq!(by_id, created);
        assert_eq!(by_identifier, created);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_identifier_before_lookup() {
        let store = MemoryCustomerStore::new();
        let clock = clock();
        let service = CustomerService::new(&store, &clock);

        let err = service
            .create(input("12345678900", "Ana Souza", "ana@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, CustomerError::InvalidIdentifier(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_conflicts_persist_nothing() {
        let store = MemoryCustomerStore::new();
        let clock = clock();
        let service = CustomerService::new(&store, &clock);
        service
            .create(input("68691814039", "Ana Souza", "ana@example.com"))
            .await
            .unwrap();

        let err = service
            .create(input("68691814039", "Bruno Lima", "bruno@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, CustomerError::IdentifierConflict));

        let err = service
            .create(input("52998224725", "Bruno Lima", "ana@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, CustomerError::EmailConflict));

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_allows_own_values_and_rejects_others() {
        let store = MemoryCustomerStore::new();
        let clock = clock();
        let service = CustomerService::new(&store, &clock);
        let ana = service
            .create(input("68691814039", "Ana Souza", "ana@example.com"))
            .await
            .unwrap();
        let bruno = service
            .create(input("52998224725", "Bruno Lima", "bruno@example.com"))
            .await
            .unwrap();

        let renamed = service
            .update(ana.id, input("68691814039", "Ana Maria Souza", "ana@example.com"))
            .await
            .unwrap();
        assert_eq!(renamed.id, ana.id);
        assert_eq!(renamed.name, "Ana Maria Souza");
        assert_eq!(renamed.created_at, ana.created_at);

        let err = service
            .update(ana.id, input("52998224725", "Ana Souza", "ana@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, CustomerError::IdentifierConflict));

        let err = service
            .update(ana.id, input("68691814039", "Ana Souza", "bruno@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, CustomerError::EmailConflict));

        assert_eq!(service.get_by_id(bruno.id).await.unwrap(), bruno);
    }

    #[tokio::test]
    async fn test_update_missing_customer() {
        let store = MemoryCustomerStore::new();
        let clock = clock();
        let service = CustomerService::new(&store, &clock);

        let err = service
            .update(CustomerId::new(42), input("68691814039", "Ana Souza", "ana@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, CustomerError::NotFound));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryCustomerStore::new();
        let clock = clock();
        let service = CustomerService::new(&store, &clock);
        let ana = service
            .create(input("68691814039", "Ana Souza", "ana@example.com"))
            .await
            .unwrap();

        let err = service.delete(CustomerId::new(999)).await.unwrap_err();
        assert!(matches!(err, CustomerError::NotFound));
        assert_eq!(store.len().await, 1);

        service.delete(ana.id).await.unwrap();
        assert!(store.is_empty().await);
        assert!(matches!(
            service.get_by_id(ana.id).await,
            Err(CustomerError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_leaves_other_customers_untouched() {
        let store = MemoryCustomerStore::new();
        let clock = clock();
        let service = CustomerService::new(&store, &clock);
        let ana = service
            .create(input("68691814039", "Ana Lima", "ana@example.com"))
            .await
            .unwrap();
        let bruno = service
            .create(input("52998224725", "Bruno Costa", "bruno@example.com"))
            .await
            .unwrap();

        service.delete(ana.id).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(service.get_by_id(bruno.id).await.unwrap(), bruno);
        assert!(matches!(
            service.get_by_id(ana.id).await,
            Err(CustomerError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_age_follows_the_clock() {
        let store = MemoryCustomerStore::new();
        let before = FixedClock::on(date(2024, 6, 14));
        let created = CustomerService::new(&store, &before)
            .create(input("68691814039", "Ana Souza", "ana@example.com"))
            .await
            .unwrap();
        assert_eq!(created.age, 33);

        let after = FixedClock::on(date(2024, 6, 15));
        let read = CustomerService::new(&store, &after)
            .get_by_id(created.id)
            .await
            .unwrap();
        assert_eq!(read.age, 34);
    }

    #[tokio::test]
    async fn test_unknown_or_malformed_identifier_is_not_found() {
        let store = MemoryCustomerStore::new();
        let clock = clock();
        let service = CustomerService::new(&store, &clock);

        assert!(matches!(
            service.get_by_identifier("52998224725").await,
            Err(CustomerError::NotFound)
        ));
        assert!(matches!(
            service.get_by_identifier("not-an-id").await,
            Err(CustomerError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_by_name_blank_fragment_lists_everything() {
        let store = MemoryCustomerStore::new();
        let clock = clock();
        let service = CustomerService::new(&store, &clock);
        service
            .create(input("68691814039", "Mariana Lima", "m@example.com"))
            .await
            .unwrap();
        service
            .create(input("52998224725", "Bruno Costa", "b@example.com"))
            .await
            .unwrap();

        let page = PageRequest::default();
        let all = service.list_by_name("   ", &page).await.unwrap();
        assert_eq!(all.total_elements, 2);
        assert_eq!(all.content[0].name, "Bruno Costa");

        let matched = service.list_by_name("ana", &page).await.unwrap();
        assert_eq!(matched.total_elements, 1);
        assert_eq!(matched.content[0].name, "Mariana Lima");

        assert_eq!(service.list_all(&page).await.unwrap(), all);
    }
}
