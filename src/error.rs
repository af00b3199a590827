use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::ports::RepositoryError;

/// Broad class of a failure, independent of transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    NotFound,
    Internal,
}

/// Every way a transfer or an order lookup can end without a result.
/// The display strings are the messages clients see.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Amount must have at most 2 decimal places and fit 15 digits")]
    AmountPrecision,

    #[error("Payer and payee must be different accounts")]
    SameAccount,

    #[error("Payer not found")]
    PayerNotFound,

    #[error("Payee not found")]
    PayeeNotFound,

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Merchants cannot send money")]
    MerchantPayer,

    #[error("Order not authorized")]
    NotAuthorized,

    #[error("Order not found")]
    OrderNotFound,

    #[error("account lookup failed")]
    AccountLookup(#[source] RepositoryError),

    #[error("ledger unavailable")]
    Ledger(#[source] RepositoryError),

    #[error("order persistence failed")]
    OrderPersistence(#[source] RepositoryError),

    #[error("error updating payer balance")]
    PayerDebit(#[source] RepositoryError),

    #[error("error updating payee balance")]
    PayeeCredit(#[source] RepositoryError),

    #[error("transfer commit failed")]
    Commit(#[source] RepositoryError),

    #[error("order lookup failed")]
    OrderLookup(#[source] RepositoryError),

    #[error("transfer timed out")]
    TimedOut(Duration),
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::InvalidAmount
            | TransferError::AmountPrecision
            | TransferError::SameAccount
            | TransferError::PayerNotFound
            | TransferError::PayeeNotFound
            | TransferError::InsufficientBalance
            | TransferError::MerchantPayer
            | TransferError::NotAuthorized => ErrorKind::InvalidRequest,
            TransferError::OrderNotFound => ErrorKind::NotFound,
            TransferError::AccountLookup(_)
            | TransferError::Ledger(_)
            | TransferError::OrderPersistence(_)
            | TransferError::PayerDebit(_)
            | TransferError::PayeeCredit(_)
            | TransferError::Commit(_)
            | TransferError::OrderLookup(_)
            | TransferError::TimedOut(_) => ErrorKind::Internal,
        }
    }

    /// Only an authorization denial is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransferError::NotAuthorized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Cause {
    pub field: String,
    pub message: String,
}

impl Cause {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{message}")]
    Validation { message: String, causes: Vec<Cause> },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

/// Wire shape of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    #[schema(value_type = String, example = "bad_request")]
    pub error: &'static str,
    pub code: u16,
    pub causes: Vec<Cause>,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_tag(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) | AppError::Validation { .. } => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::Internal(_) => "internal_server_error",
        }
    }

    pub fn body(&self) -> ErrorBody {
        let causes = match self {
            AppError::Validation { causes, .. } => causes.clone(),
            _ => Vec::new(),
        };

        ErrorBody {
            message: self.to_string(),
            error: self.error_tag(),
            code: self.status_code().as_u16(),
            causes,
        }
    }
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::InvalidRequest => AppError::InvalidRequest(message),
            ErrorKind::NotFound => AppError::NotFound(message),
            ErrorKind::Internal => AppError::Internal(message),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self.body())).into_response()
    }
}
