//! Transfer use case.
//! Resolves both parties, applies the business rules, consults the
//! authorization gate, then records the order and moves the balances inside
//! one ledger unit.

use std::sync::Arc;
use std::time::Duration;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::{self, Account, Order};
use crate::error::TransferError;
use crate::validation;
use crate::ports::{
    AccountDirectory, Authorizer, LedgerMutator, LedgerTransaction, OrderStore, RepositoryError,
};

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Input for the transfer use case.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub amount: BigDecimal,
    pub payer: Uuid,
    pub payee: Uuid,
}

#[derive(Clone)]
pub struct TransferEngine {
    accounts: Arc<dyn AccountDirectory>,
    orders: Arc<dyn OrderStore>,
    ledger: Arc<dyn LedgerMutator>,
    authorizer: Arc<dyn Authorizer>,
    deadline: Duration,
}

impl TransferEngine {
    pub fn new(
        accounts: Arc<dyn AccountDirectory>,
        orders: Arc<dyn OrderStore>,
        ledger: Arc<dyn LedgerMutator>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            accounts,
            orders,
            ledger,
            authorizer,
            deadline: DEFAULT_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Runs one transfer attempt under the engine deadline. When the deadline
    /// passes, the in-flight step is dropped and an open ledger unit rolls back.
    #[tracing::instrument(
        name = "transfer",
        skip(self, request),
        fields(journey = "transfer", payer = %request.payer, payee = %request.payee, amount = %request.amount)
    )]
    pub async fn transfer(&self, request: TransferRequest) -> Result<Order, TransferError> {
        let result = match tokio::time::timeout(self.deadline, self.run(&request)).await {
            Ok(result) => result,
            Err(_) => Err(TransferError::TimedOut(self.deadline)),
        };

        match &result {
            Ok(order) => tracing::info!(order_id = %order.id, "Transfer committed"),
            Err(e) if e.kind() == crate::error::ErrorKind::Internal => {
                tracing::error!(reason = %e, error = ?e, "Transfer failed")
            }
            Err(e) => tracing::warn!(reason = %e, "Transfer rejected"),
        }

        result
    }

    async fn run(&self, request: &TransferRequest) -> Result<Order, TransferError> {
        if request.amount <= BigDecimal::from(0) {
            return Err(TransferError::InvalidAmount);
        }
        // Balances are stored to the cent.
        if validation::validate_amount_precision(&request.amount).is_err() {
            return Err(TransferError::AmountPrecision);
        }
        if request.payer == request.payee {
            return Err(TransferError::SameAccount);
        }

        let payer = self
            .accounts
            .find_by_id(request.payer)
            .await
            .map_err(|e| not_found_or(e, TransferError::PayerNotFound, TransferError::AccountLookup))?;
        let payee = self
            .accounts
            .find_by_id(request.payee)
            .await
            .map_err(|e| not_found_or(e, TransferError::PayeeNotFound, TransferError::AccountLookup))?;

        check_payer(&payer, &request.amount)?;

        if !self.authorizer.authorize().await {
            return Err(TransferError::NotAuthorized);
        }

        let order = Order::new(request.amount.clone(), payer.id, payee.id);
        self.commit(order).await
    }

    async fn commit(&self, order: Order) -> Result<Order, TransferError> {
        let mut tx = self.ledger.begin().await.map_err(TransferError::Ledger)?;

        match apply(tx.as_mut(), &order).await {
            Ok(persisted) => {
                tx.commit().await.map_err(TransferError::Commit)?;
                Ok(persisted)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "Ledger rollback failed");
                }
                Err(e)
            }
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Order, TransferError> {
        self.orders
            .find_by_id(id)
            .await
            .map_err(|e| not_found_or(e, TransferError::OrderNotFound, TransferError::OrderLookup))
    }
}

/// Business rules a payer must satisfy for `amount` to leave the account.
pub fn check_payer(payer: &Account, amount: &BigDecimal) -> Result<(), TransferError> {
    if &payer.balance < amount {
        return Err(TransferError::InsufficientBalance);
    }
    if payer.is_merchant {
        return Err(TransferError::MerchantPayer);
    }
    Ok(())
}

/// Records the order and moves the funds. Both rows are locked in id order
/// and the payer rules are checked again on the locked balance.
async fn apply(tx: &mut dyn LedgerTransaction, order: &Order) -> Result<Order, TransferError> {
    let (payer, payee) = if order.payer < order.payee {
        let payer = lock(tx, order.payer, TransferError::PayerNotFound).await?;
        let payee = lock(tx, order.payee, TransferError::PayeeNotFound).await?;
        (payer, payee)
    } else {
        let payee = lock(tx, order.payee, TransferError::PayeeNotFound).await?;
        let payer = lock(tx, order.payer, TransferError::PayerNotFound).await?;
        (payer, payee)
    };

    check_payer(&payer, &order.amount)?;

    let persisted = tx
        .insert_order(order)
        .await
        .map_err(TransferError::OrderPersistence)?;

    tx.apply_balance(payer.id, &domain::debit(&payer, &order.amount))
        .await
        .map_err(TransferError::PayerDebit)?;

    tx.apply_balance(payee.id, &domain::credit(&payee, &order.amount))
        .await
        .map_err(TransferError::PayeeCredit)?;

    Ok(persisted)
}

async fn lock(
    tx: &mut dyn LedgerTransaction,
    id: Uuid,
    missing: TransferError,
) -> Result<Account, TransferError> {
    tx.lock_account(id)
        .await
        .map_err(|e| not_found_or(e, missing, TransferError::Ledger))
}

fn not_found_or(
    err: RepositoryError,
    missing: TransferError,
    other: fn(RepositoryError) -> TransferError,
) -> TransferError {
    match err {
        RepositoryError::NotFound(_) => missing,
        e => other(e),
    }
}
