//! Row types for SQLx. Converted into domain records at the adapter edge.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{Account, Order};

#[derive(Debug, FromRow)]
pub struct AccountRow {
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

impl AccountRow {
    pub fn into_domain(self) -> Account {
        Account {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            document: self.document,
            balance: self.balance,
            is_merchant: self.is_merchant,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub amount: BigDecimal,
    pub payee: Uuid,
    pub payer: Uuid,
    pub created_at: DateTime<Utc>,
    pub reversed_at: Option<DateTime<Utc>>,
}

impl OrderRow {
    pub fn into_domain(self) -> Order {
        Order {
            id: self.id,
            amount: self.amount,
            payee: self.payee,
            payer: self.payer,
            created_at: self.created_at,
            reversed_at: self.reversed_at,
        }
    }
}
