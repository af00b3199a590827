use async_trait::async_trait;
use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::ports::Authorizer;

const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
const DEFAULT_RESET_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum AuthorizationError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Invalid response from authorization service: {0}")]
    InvalidResponse(String),
    #[error("Circuit breaker open: {0}")]
    CircuitBreakerOpen(String),
    #[error("Invalid circuit breaker settings: {0}")]
    InvalidSettings(String),
}

/// Expected body: `{ "data": { "authorization": <bool> } }`.
#[derive(Debug, Deserialize)]
struct AuthorizationEnvelope {
    data: AuthorizationData,
}

#[derive(Debug, Deserialize)]
struct AuthorizationData {
    authorization: bool,
}

/// HTTP client for the external authorization oracle.
#[derive(Clone)]
pub struct AuthorizationClient {
    client: Client,
    url: String,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

impl AuthorizationClient {
    /// Creates a client with the default circuit breaker configuration.
    pub fn new(url: String, accept_invalid_certs: bool) -> Result<Self, AuthorizationError> {
        Self::with_circuit_breaker(
            url,
            accept_invalid_certs,
            DEFAULT_FAILURE_THRESHOLD,
            DEFAULT_RESET_TIMEOUT_SECS,
        )
    }

    /// Creates a client whose breaker opens after `failure_threshold`
    /// consecutive transport or shape failures.
    pub fn with_circuit_breaker(
        url: String,
        accept_invalid_certs: bool,
        failure_threshold: u32,
        reset_timeout_secs: u64,
    ) -> Result<Self, AuthorizationError> {
        if failure_threshold == 0 {
            return Err(AuthorizationError::InvalidSettings(
                "failure threshold must be greater than 0".to_string(),
            ));
        }
        if reset_timeout_secs == 0 {
            return Err(AuthorizationError::InvalidSettings(
                "reset timeout must be at least one second".to_string(),
            ));
        }

        if accept_invalid_certs {
            tracing::warn!(
                url = %url,
                "TLS certificate verification is DISABLED for the authorization service; never use this in production"
            );
        }

        let client = Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        let backoff = backoff::equal_jittered(
            Duration::from_secs(reset_timeout_secs),
            Duration::from_secs(reset_timeout_secs.saturating_mul(2)),
        );
        let policy = failure_policy::consecutive_failures(failure_threshold, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        Ok(AuthorizationClient {
            client,
            url,
            circuit_breaker,
        })
    }

    /// Returns the current state of the circuit breaker
    pub fn circuit_state(&self) -> String {
        if self.circuit_breaker.is_call_permitted() {
            "closed".to_string()
        } else {
            "open".to_string()
        }
    }

    /// Asks the oracle once. `Ok(false)` is a denial; `Err` means the answer
    /// could not be obtained or understood.
    pub async fn check(&self) -> Result<bool, AuthorizationError> {
        let client = self.client.clone();
        let url = self.url.clone();

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client.get(&url).send().await?;
                let status = response.status();
                let body = response.bytes().await?;

                let envelope: AuthorizationEnvelope = serde_json::from_slice(&body)
                    .map_err(|e| {
                        AuthorizationError::InvalidResponse(format!(
                            "status {}: {}",
                            status.as_u16(),
                            e
                        ))
                    })?;

                Ok::<_, AuthorizationError>(status.is_success() && envelope.data.authorization)
            })
            .await;

        match result {
            Ok(authorized) => Ok(authorized),
            Err(FailsafeError::Rejected) => Err(AuthorizationError::CircuitBreakerOpen(
                "authorization circuit breaker is open".to_string(),
            )),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}

#[async_trait]
impl Authorizer for AuthorizationClient {
    async fn authorize(&self) -> bool {
        match self.check().await {
            Ok(authorized) => authorized,
            Err(e) => {
                tracing::warn!(journey = "authorize", error = %e, "Authorization unavailable, denying");
                false
            }
        }
    }
}
