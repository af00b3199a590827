//! Framework-agnostic domain records.

pub mod account;
pub mod order;

pub use account::{credit, debit, Account, AccountUpdate};
pub use order::Order;
