pub mod in_memory;
pub mod postgres_account_repository;
pub mod postgres_ledger;
pub mod postgres_order_repository;

pub use in_memory::InMemoryStore;
pub use postgres_account_repository::PostgresAccountRepository;
pub use postgres_ledger::PostgresLedger;
pub use postgres_order_repository::PostgresOrderRepository;
