#![allow(dead_code)]

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use transfer_core::adapters::InMemoryStore;
use transfer_core::domain::Account;
use transfer_core::ports::Authorizer;
use transfer_core::services::TransferEngine;

pub fn decimal(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).expect("valid decimal")
}

pub fn account(first_name: &str, balance: &str, is_merchant: bool) -> Account {
    let now = Utc::now();
    let id = Uuid::new_v4();
    Account {
        id,
        email: format!("{}-{}@example.com", first_name.to_lowercase(), id.simple()),
        first_name: first_name.to_string(),
        last_name: "Silva".to_string(),
        document: id.simple().to_string()[..11].to_string(),
        balance: decimal(balance),
        is_merchant,
        created_at: now,
        updated_at: now,
    }
}

/// Answers from a fixed script, then `fallback` forever.
pub struct ScriptedAuthorizer {
    answers: Mutex<VecDeque<bool>>,
    fallback: bool,
    calls: AtomicUsize,
}

impl ScriptedAuthorizer {
    pub fn always(answer: bool) -> Arc<Self> {
        Self::sequence(&[], answer)
    }

    pub fn sequence(answers: &[bool], fallback: bool) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            fallback,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authorizer for ScriptedAuthorizer {
    async fn authorize(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

/// Grants after sleeping, to exercise the engine deadline.
pub struct SlowAuthorizer(pub Duration);

#[async_trait]
impl Authorizer for SlowAuthorizer {
    async fn authorize(&self) -> bool {
        tokio::time::sleep(self.0).await;
        true
    }
}

pub fn engine(store: &InMemoryStore, authorizer: Arc<dyn Authorizer>) -> TransferEngine {
    TransferEngine::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        authorizer,
    )
}

/// Store seeded with a regular payer and a merchant payee.
pub async fn seeded_store(payer_balance: &str, payee_balance: &str) -> (InMemoryStore, Account, Account) {
    let store = InMemoryStore::new();
    let payer = account("Pedro", payer_balance, false);
    let payee = account("Oliveira", payee_balance, true);
    store.insert_account(payer.clone()).await;
    store.insert_account(payee.clone()).await;
    (store, payer, payee)
}
