//! In-memory implementation of every storage port.
//!
//! Ledger units hold the store lock from `begin` until `commit`/`rollback`, so
//! they serialize the same way row locks do in Postgres. Writes are staged and
//! only become visible on commit.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::{Account, AccountUpdate, Order};
use crate::ports::{
    AccountDirectory, LedgerMutator, LedgerTransaction, OrderStore, RepositoryError,
    RepositoryResult,
};

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<Uuid, Account>,
    orders: HashMap<Uuid, Order>,
    failing_order_inserts: bool,
    failing_accounts: HashSet<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_account(&self, account: Account) {
        self.state.lock().await.accounts.insert(account.id, account);
    }

    pub async fn account(&self, id: Uuid) -> Option<Account> {
        self.state.lock().await.accounts.get(&id).cloned()
    }

    /// Overwrites the stored balance, bypassing the ledger.
    pub async fn set_balance(&self, id: Uuid, balance: bigdecimal::BigDecimal) {
        if let Some(account) = self.state.lock().await.accounts.get_mut(&id) {
            account.balance = balance;
        }
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.state.lock().await.orders.values().cloned().collect()
    }

    /// Makes every subsequent order insert fail with a database error.
    pub async fn fail_order_inserts(&self) {
        self.state.lock().await.failing_order_inserts = true;
    }

    /// Makes every subsequent balance update of `id` fail with a database error.
    pub async fn fail_balance_updates_for(&self, id: Uuid) {
        self.state.lock().await.failing_accounts.insert(id);
    }
}

#[async_trait]
impl AccountDirectory for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Account> {
        self.account(id)
            .await
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert(&self, order: &Order) -> RepositoryResult<Order> {
        let mut state = self.state.lock().await;
        if state.failing_order_inserts {
            return Err(RepositoryError::Database("order insert rejected".to_string()));
        }
        if state.orders.contains_key(&order.id) {
            return Err(RepositoryError::Database(format!(
                "duplicate order id {}",
                order.id
            )));
        }
        state.orders.insert(order.id, order.clone());
        Ok(order.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Order> {
        self.state
            .lock()
            .await
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl LedgerMutator for InMemoryStore {
    async fn begin(&self) -> RepositoryResult<Box<dyn LedgerTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        Ok(Box::new(InMemoryLedgerTransaction {
            guard,
            staged_accounts: HashMap::new(),
            staged_orders: Vec::new(),
        }))
    }
}

pub struct InMemoryLedgerTransaction {
    guard: OwnedMutexGuard<State>,
    staged_accounts: HashMap<Uuid, Account>,
    staged_orders: Vec<Order>,
}

impl InMemoryLedgerTransaction {
    fn current(&self, id: Uuid) -> Option<&Account> {
        self.staged_accounts
            .get(&id)
            .or_else(|| self.guard.accounts.get(&id))
    }
}

#[async_trait]
impl LedgerTransaction for InMemoryLedgerTransaction {
    async fn lock_account(&mut self, id: Uuid) -> RepositoryResult<Account> {
        self.current(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn insert_order(&mut self, order: &Order) -> RepositoryResult<Order> {
        if self.guard.failing_order_inserts {
            return Err(RepositoryError::Database("order insert rejected".to_string()));
        }
        let duplicate = self.guard.orders.contains_key(&order.id)
            || self.staged_orders.iter().any(|o| o.id == order.id);
        if duplicate {
            return Err(RepositoryError::Database(format!(
                "duplicate order id {}",
                order.id
            )));
        }
        self.staged_orders.push(order.clone());
        Ok(order.clone())
    }

    async fn apply_balance(
        &mut self,
        id: Uuid,
        update: &AccountUpdate,
    ) -> RepositoryResult<Account> {
        if self.guard.failing_accounts.contains(&id) {
            return Err(RepositoryError::Database(format!(
                "balance update rejected for {}",
                id
            )));
        }
        if update.balance < bigdecimal::BigDecimal::from(0) {
            return Err(RepositoryError::Database(
                "balance must not be negative".to_string(),
            ));
        }

        let mut account = self
            .current(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        account.first_name = update.first_name.clone();
        account.last_name = update.last_name.clone();
        account.balance = update.balance.clone();
        account.is_merchant = update.is_merchant;
        account.updated_at = chrono::Utc::now();

        self.staged_accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn commit(self: Box<Self>) -> RepositoryResult<()> {
        let InMemoryLedgerTransaction {
            mut guard,
            staged_accounts,
            staged_orders,
        } = *self;

        guard.accounts.extend(staged_accounts);
        for order in staged_orders {
            guard.orders.insert(order.id, order);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> RepositoryResult<()> {
        Ok(())
    }
}
