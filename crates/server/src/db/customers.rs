//! Customer repository for database operations.
//!
//! Listing queries build their `ORDER BY` clause from [`SortField`] and
//! [`SortDirection`], so they use runtime-checked `query_as` rather than
//! the compile-time macros.
//!
//! [`SortField`]: customer_registry_core::SortField
//! [`SortDirection`]: customer_registry_core::SortDirection

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use customer_registry_core::{CustomerId, Email, NationalId, Page, PageRequest};

use super::{CustomerStore, RepositoryError, map_write_error};
use crate::models::customer::{Customer, NewCustomer};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    identifier: String,
    name: String,
    birth_date: NaiveDate,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let identifier = NationalId::parse(&row.identifier).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid identifier in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: CustomerId::new(row.id),
            identifier,
            name: row.name,
            birth_date: row.birth_date,
            email,
            created_at: row.created_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, identifier, name, birth_date, email, created_at";

/// Escape `LIKE` wildcards so the fragment matches literally.
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `ORDER BY` clause for a page request. Ties are broken by ID so pages are stable.
fn order_by(page: &PageRequest) -> String {
    let sort = page.sort();
    let column = sort.field.column();
    let direction = sort.direction.keyword();
    if column == "id" {
        format!("ORDER BY id {direction}")
    } else {
        format!("ORDER BY {column} {direction}, id ASC")
    }
}

fn to_i64(value: u64) -> Result<i64, RepositoryError> {
    i64::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("value out of range: {value}")))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_page(
        &self,
        filter: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page<Customer>, RepositoryError> {
        let (where_clause, pattern) = match filter {
            Some(fragment) => (
                r"WHERE name ILIKE $1 ESCAPE '\'",
                Some(format!("%{}%", escape_like(fragment))),
            ),
            None => ("", None),
        };

        let limit = i64::from(page.size());
        let offset = to_i64(page.offset())?;

        let (count_sql, rows_sql) = if pattern.is_some() {
            (
                format!("SELECT COUNT(*) FROM registry.customers {where_clause}"),
                format!(
                    "SELECT {SELECT_COLUMNS} FROM registry.customers {where_clause} {} LIMIT $2 OFFSET $3",
                    order_by(page)
                ),
            )
        } else {
            (
                "SELECT COUNT(*) FROM registry.customers".to_owned(),
                format!(
                    "SELECT {SELECT_COLUMNS} FROM registry.customers {} LIMIT $1 OFFSET $2",
                    order_by(page)
                ),
            )
        };

        let (total, rows) = if let Some(pattern) = pattern {
            let total: i64 = sqlx::query_scalar(&count_sql)
                .bind(&pattern)
                .fetch_one(&self.pool)
                .await?;
            let rows = sqlx::query_as::<_, CustomerRow>(&rows_sql)
                .bind(&pattern)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
            (total, rows)
        } else {
            let total: i64 = sqlx::query_scalar(&count_sql)
                .fetch_one(&self.pool)
                .await?;
            let rows = sqlx::query_as::<_, CustomerRow>(&rows_sql)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
            (total, rows)
        };

        let content = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Customer>, _>>()?;
        let total = u64::try_from(total).map_err(|_| {
            RepositoryError::DataCorruption(format!("negative row count: {total}"))
        })?;

        Ok(Page::new(content, page, total))
    }
}

#[async_trait]
impl CustomerStore for PgCustomerRepository {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM registry.customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_identifier(
        &self,
        identifier: &NationalId,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM registry.customers WHERE identifier = $1"
        ))
        .bind(identifier.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM registry.customers WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_name_containing(
        &self,
        fragment: &str,
        page: &PageRequest,
    ) -> Result<Page<Customer>, RepositoryError> {
        self.fetch_page(Some(fragment), page).await
    }

    async fn find_all(&self, page: &PageRequest) -> Result<Page<Customer>, RepositoryError> {
        self.fetch_page(None, page).await
    }

    async fn insert(&self, customer: NewCustomer) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r"
            INSERT INTO registry.customers (identifier, name, birth_date, email, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SELECT_COLUMNS}
            "
        ))
        .bind(customer.identifier.as_str())
        .bind(&customer.name)
        .bind(customer.birth_date)
        .bind(&customer.email)
        .bind(customer.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        row.try_into()
    }

    async fn update(&self, customer: &Customer) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r"
            UPDATE registry.customers
            SET identifier = $2, name = $3, birth_date = $4, email = $5
            WHERE id = $1
            RETURNING {SELECT_COLUMNS}
            "
        ))
        .bind(customer.id)
        .bind(customer.identifier.as_str())
        .bind(&customer.name)
        .bind(customer.birth_date)
        .bind(&customer.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn exists_by_id(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM registry.customers WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn delete_by_id(&self, id: CustomerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM registry.customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use customer_registry_core::{Sort, SortDirection, SortField};

    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("ana"), "ana");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn test_order_by() {
        assert_eq!(order_by(&PageRequest::default()), "ORDER BY name ASC, id ASC");

        let sort = Sort {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        };
        let page = PageRequest::new(0, 10, sort).unwrap_or_default();
        assert_eq!(order_by(&page), "ORDER BY created_at DESC, id ASC");

        let sort = Sort {
            field: SortField::Id,
            direction: SortDirection::Desc,
        };
        let page = PageRequest::new(0, 10, sort).unwrap_or_default();
        assert_eq!(order_by(&page), "ORDER BY id DESC");
    }
}
