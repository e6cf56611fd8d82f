//! In-memory stores.
//!
//! Used by the test suites and for running the server without a database.
//! Each store keeps its records behind one `RwLock`; uniqueness checks and
//! writes happen under the same write guard, so they report the same
//! `Conflict` constraint names as `PostgreSQL` would.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use customer_registry_core::{
    CustomerId, Email, IdentityId, NationalId, Page, PageRequest, SortDirection, SortField,
};

use super::{
    CUSTOMER_EMAIL_KEY, CUSTOMER_IDENTIFIER_KEY, CustomerStore, IDENTITY_HANDLE_KEY,
    IdentityStore, RepositoryError,
};
use crate::models::customer::{Customer, NewCustomer};
use crate::models::identity::{Identity, NewIdentity};

// =============================================================================
// Customers
// =============================================================================

#[derive(Default)]
struct CustomerTable {
    next_id: i64,
    rows: BTreeMap<CustomerId, Customer>,
}

impl CustomerTable {
    /// Constraint violated by writing `candidate`, ignoring the row with `own_id`.
    fn violated_constraint(
        &self,
        candidate: &Customer,
        own_id: Option<CustomerId>,
    ) -> Option<&'static str> {
        let mut others = self.rows.values().filter(|c| Some(c.id) != own_id);
        if others.clone().any(|c| c.identifier == candidate.identifier) {
            Some(CUSTOMER_IDENTIFIER_KEY)
        } else if others.any(|c| c.email == candidate.email) {
            Some(CUSTOMER_EMAIL_KEY)
        } else {
            None
        }
    }
}

/// Process-local customer store.
///
/// Cheaply cloneable via `Arc`; all clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryCustomerStore {
    inner: Arc<RwLock<CustomerTable>>,
}

impl MemoryCustomerStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored customers.
    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    /// Whether the store holds no customers.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.rows.is_empty()
    }
}

fn compare(a: &Customer, b: &Customer, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::BirthDate => a.birth_date.cmp(&b.birth_date),
        SortField::Id => a.id.cmp(&b.id),
    }
}

fn paginate(mut matches: Vec<Customer>, page: &PageRequest) -> Page<Customer> {
    let sort = page.sort();
    matches.sort_by(|a, b| {
        let ordering = compare(a, b, sort.field);
        let ordering = match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        ordering.then_with(|| a.id.cmp(&b.id))
    });

    let total = u64::try_from(matches.len()).unwrap_or(u64::MAX);
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let size = usize::try_from(page.size()).unwrap_or(usize::MAX);
    let content = matches.into_iter().skip(offset).take(size).collect();

    Page::new(content, page, total)
}

#[async_trait]
impl CustomerStore for MemoryCustomerStore {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn find_by_identifier(
        &self,
        identifier: &NationalId,
    ) -> Result<Option<Customer>, RepositoryError> {
        let table = self.inner.read().await;
        Ok(table
            .rows
            .values()
            .find(|c| &c.identifier == identifier)
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        let table = self.inner.read().await;
        Ok(table.rows.values().find(|c| &c.email == email).cloned())
    }

    async fn find_by_name_containing(
        &self,
        fragment: &str,
        page: &PageRequest,
    ) -> Result<Page<Customer>, RepositoryError> {
        let needle = fragment.to_lowercase();
        let table = self.inner.read().await;
        let matches = table
            .rows
            .values()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();

        Ok(paginate(matches, page))
    }

    async fn find_all(&self, page: &PageRequest) -> Result<Page<Customer>, RepositoryError> {
        let table = self.inner.read().await;
        Ok(paginate(table.rows.values().cloned().collect(), page))
    }

    async fn insert(&self, customer: NewCustomer) -> Result<Customer, RepositoryError> {
        let mut table = self.inner.write().await;
        let customer = customer.with_id(CustomerId::new(table.next_id + 1));

        if let Some(constraint) = table.violated_constraint(&customer, None) {
            return Err(RepositoryError::Conflict(constraint.to_owned()));
        }

        table.next_id += 1;
        table.rows.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn update(&self, customer: &Customer) -> Result<Customer, RepositoryError> {
        let mut table = self.inner.write().await;

        let created_at = table
            .rows
            .get(&customer.id)
            .map(|existing| existing.created_at)
            .ok_or(RepositoryError::NotFound)?;

        if let Some(constraint) = table.violated_constraint(customer, Some(customer.id)) {
            return Err(RepositoryError::Conflict(constraint.to_owned()));
        }

        let updated = Customer {
            created_at,
            ..customer.clone()
        };
        table.rows.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn exists_by_id(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        Ok(self.inner.read().await.rows.contains_key(&id))
    }

    async fn delete_by_id(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        Ok(self.inner.write().await.rows.remove(&id).is_some())
    }
}

// =============================================================================
// Identities
// =============================================================================

#[derive(Default)]
struct IdentityTable {
    next_id: i64,
    rows: BTreeMap<String, Identity>,
}

/// Process-local identity store, keyed by handle.
#[derive(Clone, Default)]
pub struct MemoryIdentityStore {
    inner: Arc<RwLock<IdentityTable>>,
}

impl MemoryIdentityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Identity>, RepositoryError> {
        Ok(self.inner.read().await.rows.get(handle).cloned())
    }

    async fn insert(&self, identity: NewIdentity) -> Result<Identity, RepositoryError> {
        let mut table = self.inner.write().await;
        if table.rows.contains_key(&identity.handle) {
            return Err(RepositoryError::Conflict(IDENTITY_HANDLE_KEY.to_owned()));
        }

        table.next_id += 1;
        let identity = identity.with_id(IdentityId::new(table.next_id));
        table.rows.insert(identity.handle.clone(), identity.clone());
        Ok(identity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use customer_registry_core::Sort;

    use super::*;

    fn new_customer(identifier: &str, name: &str, email: &str) -> NewCustomer {
        NewCustomer {
            identifier: NationalId::parse(identifier).unwrap(),
            name: name.to_owned(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            email: Email::parse(email).unwrap(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_enforces_uniqueness() {
        let store = MemoryCustomerStore::new();
        let first = store
            .insert(new_customer("68691814039", "Ana", "ana@example.com"))
            .await
            .unwrap();
        let second = store
            .insert(new_customer("52998224725", "Bruno", "bruno@example.com"))
            .await
            .unwrap();
        assert_eq!(first.id, CustomerId::new(1));
        assert_eq!(second.id, CustomerId::new(2));

        let err = store
            .insert(new_customer("68691814039", "Carla", "carla@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.conflict_constraint(), Some(CUSTOMER_IDENTIFIER_KEY));

        let err = store
            .insert(new_customer("11144477735", "Carla", "ana@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.conflict_constraint(), Some(CUSTOMER_EMAIL_KEY));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_update_keeps_created_at_and_allows_own_values() {
        let store = MemoryCustomerStore::new();
        let stored = store
            .insert(new_customer("68691814039", "Ana", "ana@example.com"))
            .await
            .unwrap();

        let renamed = Customer {
            name: "Ana Maria".to_owned(),
            created_at: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            ..stored.clone()
        };
        let updated = store.update(&renamed).await.unwrap();
        assert_eq!(updated.name, "Ana Maria");
        assert_eq!(updated.created_at, stored.created_at);

        let missing = Customer {
            id: CustomerId::new(99),
            ..stored
        };
        assert!(matches!(
            store.update(&missing).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_name_search_is_case_insensitive_and_paged() {
        let store = MemoryCustomerStore::new();
        for (identifier, name, email) in [
            ("68691814039", "Mariana Lima", "m1@example.com"),
            ("52998224725", "Ana Paula", "m2@example.com"),
            ("11144477735", "Bruno Costa", "m3@example.com"),
            ("93541134780", "Juliana Anastacio", "m4@example.com"),
        ] {
            store
                .insert(new_customer(identifier, name, email))
                .await
                .unwrap();
        }

        let page = store
            .find_by_name_containing("ANA", &PageRequest::default())
            .await
            .unwrap();
        let names: Vec<_> = page.content.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ana Paula", "Juliana Anastacio", "Mariana Lima"]);
        assert_eq!(page.total_elements, 3);

        let second = PageRequest::new(1, 2, Sort::default()).unwrap();
        let page = store.find_all(&second).await.unwrap();
        assert_eq!(page.total_elements, 4);
        assert_eq!(page.total_pages, 2);
        let names: Vec<_> = page.content.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Juliana Anastacio", "Mariana Lima"]);
    }

    #[tokio::test]
    async fn test_name_order_ignores_case() {
        let store = MemoryCustomerStore::new();
        store
            .insert(new_customer("11144477735", "Bruno Costa", "b@example.com"))
            .await
            .unwrap();
        store
            .insert(new_customer("68691814039", "ana lima", "a@example.com"))
            .await
            .unwrap();

        let page = store.find_all(&PageRequest::default()).await.unwrap();
        let names: Vec<_> = page.content.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["ana lima", "Bruno Costa"]);
    }

    #[tokio::test]
    async fn test_identity_handle_is_unique() {
        let store = MemoryIdentityStore::new();
        let identity = store
            .insert(NewIdentity {
                handle: "operator".to_owned(),
                secret_hash: "hash-1".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(identity.id, IdentityId::new(1));

        let err = store
            .insert(NewIdentity {
                handle: "operator".to_owned(),
                secret_hash: "hash-2".to_owned(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.conflict_constraint(), Some(IDENTITY_HANDLE_KEY));

        let stored = store.find_by_handle("operator").await.unwrap().unwrap();
        assert_eq!(stored.secret_hash, "hash-1");
    }
}
