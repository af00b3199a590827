use sqlx::{Executor, Postgres, Result};
use uuid::Uuid;

use crate::db::models::{AccountRow, OrderRow};
use crate::domain::{AccountUpdate, Order};

const ACCOUNT_COLUMNS: &str =
    "id, email, first_name, last_name, document, balance, is_merchant, created_at, updated_at";

// --- Account Queries ---

pub async fn find_account<'e, E>(executor: E, id: Uuid) -> Result<Option<AccountRow>>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, AccountRow>(&format!(
        "SELECT {} FROM users WHERE id = $1",
        ACCOUNT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Same as `find_account` but takes a row lock held until the surrounding
/// transaction ends.
pub async fn find_account_for_update<'e, E>(executor: E, id: Uuid) -> Result<Option<AccountRow>>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, AccountRow>(&format!(
        "SELECT {} FROM users WHERE id = $1 FOR UPDATE",
        ACCOUNT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn update_account<'e, E>(
    executor: E,
    id: Uuid,
    update: &AccountUpdate,
) -> Result<Option<AccountRow>>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, AccountRow>(&format!(
        r#"
        UPDATE users
        SET first_name = $2, last_name = $3, balance = $4, is_merchant = $5, updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        ACCOUNT_COLUMNS
    ))
    .bind(id)
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.balance)
    .bind(update.is_merchant)
    .fetch_optional(executor)
    .await
}

// --- Order Queries ---

pub async fn insert_order<'e, E>(executor: E, order: &Order) -> Result<OrderRow>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, OrderRow>(
        r#"
        INSERT INTO orders (id, amount, payee, payer, created_at, reversed_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, amount, payee, payer, created_at, reversed_at
        "#,
    )
    .bind(order.id)
    .bind(&order.amount)
    .bind(order.payee)
    .bind(order.payer)
    .bind(order.created_at)
    .bind(order.reversed_at)
    .fetch_one(executor)
    .await
}

pub async fn find_order<'e, E>(executor: E, id: Uuid) -> Result<Option<OrderRow>>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, OrderRow>(
        "SELECT id, amount, payee, payer, created_at, reversed_at FROM orders WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}
