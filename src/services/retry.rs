//! Bounded retry for transfers denied by the authorization gate.
//! The engine never retries on its own; callers opt in here.

use std::time::Duration;

use tokio::time::sleep;

use crate::domain::Order;
use crate::error::TransferError;
use crate::services::transfer::{TransferEngine, TransferRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Delay before attempt `attempt + 1`, doubling from `initial_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(2u32.pow(exponent))
            .min(self.max_backoff)
    }
}

/// Repeats `transfer` while the gate denies, up to `policy.max_attempts`.
/// Every attempt re-reads both accounts, so a balance drained in between is
/// rejected rather than passed on a stale check.
pub async fn transfer_with_retry(
    engine: &TransferEngine,
    request: &TransferRequest,
    policy: &RetryPolicy,
) -> Result<Order, TransferError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match engine.transfer(request.clone()).await {
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let backoff = policy.backoff(attempt);
                tracing::warn!(
                    "Transfer attempt {} of {} not authorized. Retrying in {:?}",
                    attempt,
                    max_attempts,
                    backoff
                );
                sleep(backoff).await;
            }
            Err(e) if e.is_retryable() => {
                tracing::error!("Transfer not authorized after {} attempts", attempt);
                return Err(e);
            }
            other => return other,
        }
    }
}
