//! Seams between the transfer engine and its collaborators.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Account, AccountUpdate, Order};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("row not found".to_string()),
            other => RepositoryError::Database(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Read access to account records.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Account>;
}

/// Persists and retrieves transfer records. Assigns no identifiers.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> RepositoryResult<Order>;
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Order>;
}

/// Opens atomic units in which an order is recorded and balances are moved.
#[async_trait]
pub trait LedgerMutator: Send + Sync {
    async fn begin(&self) -> RepositoryResult<Box<dyn LedgerTransaction>>;
}

/// One atomic unit of ledger work. Dropping it without `commit` discards
/// every change made through it.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Reads the account and holds it exclusively until the unit ends.
    async fn lock_account(&mut self, id: Uuid) -> RepositoryResult<Account>;

    async fn insert_order(&mut self, order: &Order) -> RepositoryResult<Order>;

    /// Writes the full profile update (names, balance, merchant flag).
    async fn apply_balance(&mut self, id: Uuid, update: &AccountUpdate)
        -> RepositoryResult<Account>;

    async fn commit(self: Box<Self>) -> RepositoryResult<()>;

    async fn rollback(self: Box<Self>) -> RepositoryResult<()>;
}

/// External yes/no gate consulted before any money moves.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self) -> bool;
}
