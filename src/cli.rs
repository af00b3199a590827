use bigdecimal::BigDecimal;
use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "transfer-core")]
#[command(about = "Transfer Core - account to account transfers with external authorization", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Configuration validation
    Config,

    /// Transfer funds, retrying while the authorization service denies
    Transfer {
        /// Account debited
        #[arg(long)]
        payer: Uuid,
        /// Account credited
        #[arg(long)]
        payee: Uuid,
        /// Amount to move, e.g. 100.00
        #[arg(long)]
        amount: BigDecimal,
        /// Overrides TRANSFER_MAX_ATTEMPTS
        #[arg(long)]
        max_attempts: Option<u32>,
    },

    /// Show a persisted order
    Order {
        /// Order UUID
        #[arg(value_name = "ORDER_ID")]
        id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}
