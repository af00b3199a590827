pub mod retry;
pub mod transfer;

pub use retry::{transfer_with_retry, RetryPolicy};
pub use transfer::{TransferEngine, TransferRequest};
