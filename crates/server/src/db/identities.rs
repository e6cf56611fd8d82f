//! Identity repository for database operations.

use async_trait::async_trait;
use sqlx::PgPool;

use customer_registry_core::IdentityId;

use super::{IdentityStore, RepositoryError, map_write_error};
use crate::models::identity::{Identity, NewIdentity};

/// Internal row type for `PostgreSQL` identity queries.
#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: i64,
    handle: String,
    secret_hash: String,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Self {
            id: IdentityId::new(row.id),
            handle: row.handle,
            secret_hash: row.secret_hash,
        }
    }
}

/// Repository for identity database operations.
#[derive(Debug, Clone)]
pub struct PgIdentityRepository {
    pool: PgPool,
}

impl PgIdentityRepository {
    /// Create a new identity repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityRepository {
    async fn find_by_handle(&self, handle: &str) -> Result<Option<Identity>, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r"
            SELECT id, handle, secret_hash
            FROM registry.identities
            WHERE handle = $1
            ",
        )
        .bind(handle)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn insert(&self, identity: NewIdentity) -> Result<Identity, RepositoryError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r"
            INSERT INTO registry.identities (handle, secret_hash)
            VALUES ($1, $2)
            RETURNING id, handle, secret_hash
            ",
        )
        .bind(&identity.handle)
        .bind(&identity.secret_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.into())
    }
}
