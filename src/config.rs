use anyhow::Context;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub authorization_url: String,
    /// Skips TLS certificate verification on the authorization call.
    /// Only for local or staging oracles with self-signed certificates.
    pub authorization_accept_invalid_certs: bool,
    pub authorization_failure_threshold: u32,
    pub authorization_reset_timeout_secs: u64,
    pub transfer_timeout_secs: u64,
    pub transfer_max_attempts: u32,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: parse_var("SERVER_PORT", 3000)?,
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
            authorization_url: env::var("AUTHORIZATION_URL")
                .context("AUTHORIZATION_URL must be set")?,
            authorization_accept_invalid_certs: parse_var(
                "AUTHORIZATION_ACCEPT_INVALID_CERTS",
                false,
            )?,
            authorization_failure_threshold: parse_var("AUTHORIZATION_FAILURE_THRESHOLD", 5)?,
            authorization_reset_timeout_secs: parse_var("AUTHORIZATION_RESET_TIMEOUT_SECS", 30)?,
            transfer_timeout_secs: parse_var("TRANSFER_TIMEOUT_SECS", 10)?,
            transfer_max_attempts: parse_var("TRANSFER_MAX_ATTEMPTS", 5)?,
            log_format: parse_var("LOG_FORMAT", LogFormat::Pretty)?,
        })
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout_secs)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database_url.is_empty() {
            anyhow::bail!("DATABASE_URL is empty");
        }
        if self.authorization_url.is_empty() {
            anyhow::bail!("AUTHORIZATION_URL is empty");
        }
        if self.server_port == 0 {
            anyhow::bail!("SERVER_PORT must be greater than 0");
        }
        if self.database_max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be greater than 0");
        }
        if self.transfer_timeout_secs == 0 {
            anyhow::bail!("TRANSFER_TIMEOUT_SECS must be greater than 0");
        }
        if self.transfer_max_attempts == 0 {
            anyhow::bail!("TRANSFER_MAX_ATTEMPTS must be greater than 0");
        }
        if self.authorization_failure_threshold == 0 {
            anyhow::bail!("AUTHORIZATION_FAILURE_THRESHOLD must be greater than 0");
        }
        if self.authorization_reset_timeout_secs == 0 {
            anyhow::bail!("AUTHORIZATION_RESET_TIMEOUT_SECS must be greater than 0");
        }

        url::Url::parse(&self.authorization_url)
            .context("AUTHORIZATION_URL is not a valid URL")?;
        url::Url::parse(&self.database_url).context("DATABASE_URL is not a valid URL")?;

        Ok(())
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} is invalid: {}", name, e)),
        Err(_) => Ok(default),
    }
}
