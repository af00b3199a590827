//! Account domain entity.
//! Accounts are owned by the account directory; the transfer core only reads
//! them and asks for balance updates.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Domain entity representing a party that can send or receive funds.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub document: String,
    pub balance: BigDecimal,
    pub is_merchant: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full profile write applied by the ledger mutator.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountUpdate {
    pub first_name: String,
    pub last_name: String,
    pub balance: BigDecimal,
    pub is_merchant: bool,
}

impl AccountUpdate {
    fn with_balance(account: &Account, balance: BigDecimal) -> Self {
        Self {
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            balance,
            is_merchant: account.is_merchant,
        }
    }
}

/// Update that removes `amount` from the account balance.
pub fn debit(account: &Account, amount: &BigDecimal) -> AccountUpdate {
    AccountUpdate::with_balance(account, &account.balance - amount)
}

/// Update that adds `amount` to the account balance.
pub fn credit(account: &Account, amount: &BigDecimal) -> AccountUpdate {
    AccountUpdate::with_balance(account, &account.balance + amount)
}
