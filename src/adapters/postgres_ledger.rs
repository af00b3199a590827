//! Postgres implementation of LedgerMutator.
//!
//! Each unit of work is one database transaction. Account rows are locked with
//! `FOR UPDATE`, so concurrent transfers touching the same account serialize on
//! the row instead of racing on a stale balance.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::db::queries;
use crate::domain::{Account, AccountUpdate, Order};
use crate::ports::{LedgerMutator, LedgerTransaction, RepositoryError, RepositoryResult};

#[derive(Clone)]
pub struct PostgresLedger {
    pool: PgPool,
}

impl PostgresLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerMutator for PostgresLedger {
    async fn begin(&self) -> RepositoryResult<Box<dyn LedgerTransaction>> {
        let tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        Ok(Box::new(PostgresLedgerTransaction { tx }))
    }
}

pub struct PostgresLedgerTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTransaction for PostgresLedgerTransaction {
    async fn lock_account(&mut self, id: Uuid) -> RepositoryResult<Account> {
        let row = queries::find_account_for_update(&mut *self.tx, id)
            .await
            .map_err(RepositoryError::from)?;

        row.map(|r| r.into_domain())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn insert_order(&mut self, order: &Order) -> RepositoryResult<Order> {
        let row = queries::insert_order(&mut *self.tx, order)
            .await
            .map_err(RepositoryError::from)?;

        Ok(row.into_domain())
    }

    async fn apply_balance(
        &mut self,
        id: Uuid,
        update: &AccountUpdate,
    ) -> RepositoryResult<Account> {
        let row = queries::update_account(&mut *self.tx, id, update)
            .await
            .map_err(RepositoryError::from)?;

        row.map(|r| r.into_domain())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn commit(self: Box<Self>) -> RepositoryResult<()> {
        self.tx.commit().await.map_err(RepositoryError::from)
    }

    async fn rollback(self: Box<Self>) -> RepositoryResult<()> {
        self.tx.rollback().await.map_err(RepositoryError::from)
    }
}
