pub mod adapters;
pub mod authorization;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod ports;
pub mod services;
pub mod validation;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;

use crate::adapters::{PostgresAccountRepository, PostgresLedger, PostgresOrderRepository};
use crate::middleware::request_logger::request_logger_middleware;
use crate::ports::Authorizer;
use crate::services::TransferEngine;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub engine: TransferEngine,
}

/// Wires the Postgres adapters around one shared pool.
pub fn build_engine(pool: &PgPool, authorizer: Arc<dyn Authorizer>) -> TransferEngine {
    TransferEngine::new(
        Arc::new(PostgresAccountRepository::new(pool.clone())),
        Arc::new(PostgresOrderRepository::new(pool.clone())),
        Arc::new(PostgresLedger::new(pool.clone())),
        authorizer,
    )
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/order", post(handlers::orders::create_order))
        .route("/order/:id", get(handlers::orders::get_order))
        .route("/docs/openapi.json", get(openapi::openapi_json))
        .layer(axum::middleware::from_fn(request_logger_middleware))
        .with_state(state)
}
