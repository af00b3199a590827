//! Postgres implementation of OrderStore.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::queries;
use crate::domain::Order;
use crate::ports::{OrderStore, RepositoryError, RepositoryResult};

/// Postgres-backed order repository.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PostgresOrderRepository {
    async fn insert(&self, order: &Order) -> RepositoryResult<Order> {
        let row = queries::insert_order(&self.pool, order)
            .await
            .map_err(RepositoryError::from)?;

        Ok(row.into_domain())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Order> {
        let row = queries::find_order(&self.pool, id)
            .await
            .map_err(RepositoryError::from)?;

        row.map(|r| r.into_domain())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }
}
