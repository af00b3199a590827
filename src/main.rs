use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt}; // for .with() on registry

use transfer_core::authorization::AuthorizationClient;
use transfer_core::cli::{Cli, Commands, DbCommands};
use transfer_core::config::{Config, LogFormat};
use transfer_core::services::{transfer_with_retry, RetryPolicy, TransferEngine, TransferRequest};
use transfer_core::{build_engine, create_app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Db(DbCommands::Migrate) => {
            let pool = db::create_pool(&config).await?;
            db::run_migrations(&pool).await?;
            Ok(())
        }
        Commands::Config => {
            config.validate()?;
            println!("Configuration is valid");
            Ok(())
        }
        Commands::Transfer {
            payer,
            payee,
            amount,
            max_attempts,
        } => {
            let engine = engine_from_config(&config).await?;
            let policy = RetryPolicy::new(max_attempts.unwrap_or(config.transfer_max_attempts));
            let request = TransferRequest {
                amount,
                payer,
                payee,
            };
            let order = transfer_with_retry(&engine, &request, &policy).await?;
            println!("{}", serde_json::to_string_pretty(&order)?);
            Ok(())
        }
        Commands::Order { id } => {
            let engine = engine_from_config(&config).await?;
            let order = engine.find_by_id(id).await?;
            println!("{}", serde_json::to_string_pretty(&order)?);
            Ok(())
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn engine_from_config(config: &Config) -> anyhow::Result<TransferEngine> {
    config.validate()?;
    let pool = db::create_pool(config).await?;
    engine_with_pool(config, &pool)
}

fn engine_with_pool(config: &Config, pool: &sqlx::PgPool) -> anyhow::Result<TransferEngine> {
    let authorizer = AuthorizationClient::with_circuit_breaker(
        config.authorization_url.clone(),
        config.authorization_accept_invalid_certs,
        config.authorization_failure_threshold,
        config.authorization_reset_timeout_secs,
    )?;
    tracing::info!(
        "Authorization client initialized with URL: {}",
        config.authorization_url
    );

    Ok(build_engine(pool, Arc::new(authorizer)).with_deadline(config.transfer_timeout()))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    config.validate()?;

    // Database pool
    let pool = db::create_pool(&config).await?;
    db::run_migrations(&pool).await?;

    let engine = engine_with_pool(&config, &pool)?;
    let app = create_app(AppState { db: pool, engine });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
