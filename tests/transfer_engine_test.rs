mod common;

use std::time::Duration;

use common::{account, decimal, engine, seeded_store, ScriptedAuthorizer, SlowAuthorizer};
use transfer_core::error::{ErrorKind, TransferError};
use transfer_core::ports::{OrderStore, RepositoryError};
use transfer_core::services::TransferRequest;
use uuid::Uuid;

fn request(amount: &str, payer: Uuid, payee: Uuid) -> TransferRequest {
    TransferRequest {
        amount: decimal(amount),
        payer,
        payee,
    }
}

#[tokio::test]
async fn test_successful_transfer_moves_funds() {
    let (store, payer, payee) = seeded_store("1000.00", "200.00").await;
    let engine = engine(&store, ScriptedAuthorizer::always(true));

    let order = engine
        .transfer(request("100.00", payer.id, payee.id))
        .await
        .expect("transfer should commit");

    assert_eq!(order.amount, decimal("100.00"));
    assert_eq!(order.payer, payer.id);
    assert_eq!(order.payee, payee.id);
    assert!(order.reversed_at.is_none());

    assert_eq!(store.account(payer.id).await.unwrap().balance, decimal("900.00"));
    assert_eq!(store.account(payee.id).await.unwrap().balance, decimal("300.00"));

    let orders = store.orders().await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0], order);
}

#[tokio::test]
async fn test_transfer_keeps_profile_fields() {
    let (store, payer, payee) = seeded_store("50.00", "0.00").await;
    let engine = engine(&store, ScriptedAuthorizer::always(true));

    engine
        .transfer(request("50.00", payer.id, payee.id))
        .await
        .unwrap();

    let payer_after = store.account(payer.id).await.unwrap();
    let payee_after = store.account(payee.id).await.unwrap();
    assert_eq!(payer_after.balance, decimal("0.00"));
    assert_eq!(payer_after.first_name, payer.first_name);
    assert!(!payer_after.is_merchant);
    assert!(payee_after.is_merchant);
}

#[tokio::test]
async fn test_insufficient_balance_changes_nothing() {
    let (store, payer, payee) = seeded_store("200.00", "1000.00").await;
    let authorizer = ScriptedAuthorizer::always(true);
    let engine = engine(&store, authorizer.clone());

    let err = engine
        .transfer(request("201.00", payer.id, payee.id))
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::InsufficientBalance));
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    assert_eq!(err.to_string(), "Insufficient balance");
    assert_eq!(authorizer.calls(), 0);
    assert_eq!(store.account(payer.id).await.unwrap().balance, decimal("200.00"));
    assert_eq!(store.account(payee.id).await.unwrap().balance, decimal("1000.00"));
    assert!(store.orders().await.is_empty());
}

#[tokio::test]
async fn test_merchant_cannot_send_money() {
    let (store, regular, merchant) = seeded_store("200.00", "1000.00").await;
    let engine = engine(&store, ScriptedAuthorizer::always(true));

    let err = engine
        .transfer(request("200.00", merchant.id, regular.id))
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::MerchantPayer));
    assert_eq!(err.to_string(), "Merchants cannot send money");
    assert_eq!(store.account(merchant.id).await.unwrap().balance, decimal("1000.00"));
    assert_eq!(store.account(regular.id).await.unwrap().balance, decimal("200.00"));
    assert!(store.orders().await.is_empty());
}

#[tokio::test]
async fn test_unknown_parties_are_validation_failures() {
    let (store, payer, payee) = seeded_store("100.00", "0.00").await;
    let engine = engine(&store, ScriptedAuthorizer::always(true));

    let err = engine
        .transfer(request("10.00", Uuid::new_v4(), payee.id))
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::PayerNotFound));
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    assert_eq!(err.to_string(), "Payer not found");

    let err = engine
        .transfer(request("10.00", payer.id, Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::PayeeNotFound));
    assert_eq!(err.to_string(), "Payee not found");
}

#[tokio::test]
async fn test_denied_authorization_changes_nothing() {
    let (store, payer, payee) = seeded_store("1000.00", "200.00").await;
    let authorizer = ScriptedAuthorizer::always(false);
    let engine = engine(&store, authorizer.clone());

    let err = engine
        .transfer(request("100.00", payer.id, payee.id))
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::NotAuthorized));
    assert_eq!(err.to_string(), "Order not authorized");
    assert_eq!(authorizer.calls(), 1);
    assert_eq!(store.account(payer.id).await.unwrap().balance, decimal("1000.00"));
    assert!(store.orders().await.is_empty());
}

#[tokio::test]
async fn test_rejects_non_positive_amount_and_self_transfer() {
    let (store, payer, payee) = seeded_store("1000.00", "200.00").await;
    let engine = engine(&store, ScriptedAuthorizer::always(true));

    let err = engine
        .transfer(request("0", payer.id, payee.id))
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::InvalidAmount));

    let err = engine
        .transfer(request("-5.00", payer.id, payee.id))
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::InvalidAmount));

    let err = engine
        .transfer(request("10.00", payer.id, payer.id))
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::SameAccount));
    assert_eq!(store.account(payer.id).await.unwrap().balance, decimal("1000.00"));
}

#[tokio::test]
async fn test_rejects_sub_cent_amounts() {
    let (store, payer, payee) = seeded_store("1000.00", "200.00").await;
    let authorizer = ScriptedAuthorizer::always(true);
    let engine = engine(&store, authorizer.clone());

    for amount in ["0.005", "100.001", "12345678901234.00"] {
        let err = engine
            .transfer(request(amount, payer.id, payee.id))
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::AmountPrecision), "amount {amount}");
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    // Trailing zeros past the cent are fine.
    engine
        .transfer(request("0.010", payer.id, payee.id))
        .await
        .unwrap();

    assert_eq!(authorizer.calls(), 1);
    assert_eq!(store.orders().await.len(), 1);
    assert_eq!(store.account(payer.id).await.unwrap().balance, decimal("999.99"));
    assert_eq!(store.account(payee.id).await.unwrap().balance, decimal("200.01"));
}

#[tokio::test]
async fn test_order_persistence_failure_leaves_balances() {
    let (store, payer, payee) = seeded_store("1000.00", "200.00").await;
    store.fail_order_inserts().await;
    let engine = engine(&store, ScriptedAuthorizer::always(true));

    let err = engine
        .transfer(request("100.00", payer.id, payee.id))
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::OrderPersistence(_)));
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(err.to_string(), "order persistence failed");
    assert_eq!(store.account(payer.id).await.unwrap().balance, decimal("1000.00"));
    assert_eq!(store.account(payee.id).await.unwrap().balance, decimal("200.00"));
}

#[tokio::test]
async fn test_payer_debit_failure_rolls_back_order() {
    let (store, payer, payee) = seeded_store("1000.00", "200.00").await;
    store.fail_balance_updates_for(payer.id).await;
    let engine = engine(&store, ScriptedAuthorizer::always(true));

    let err = engine
        .transfer(request("100.00", payer.id, payee.id))
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::PayerDebit(_)));
    assert_eq!(err.to_string(), "error updating payer balance");
    assert!(store.orders().await.is_empty());
    assert_eq!(store.account(payer.id).await.unwrap().balance, decimal("1000.00"));
    assert_eq!(store.account(payee.id).await.unwrap().balance, decimal("200.00"));
}

#[tokio::test]
async fn test_payee_credit_failure_rolls_back_debit_and_order() {
    let (store, payer, payee) = seeded_store("1000.00", "200.00").await;
    store.fail_balance_updates_for(payee.id).await;
    let engine = engine(&store, ScriptedAuthorizer::always(true));

    let err = engine
        .transfer(request("100.00", payer.id, payee.id))
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::PayeeCredit(_)));
    assert_eq!(err.to_string(), "error updating payee balance");
    assert!(store.orders().await.is_empty());
    assert_eq!(store.account(payer.id).await.unwrap().balance, decimal("1000.00"));
    assert_eq!(store.account(payee.id).await.unwrap().balance, decimal("200.00"));
}

#[tokio::test]
async fn test_deadline_aborts_transfer() {
    let (store, payer, payee) = seeded_store("1000.00", "200.00").await;
    let engine = engine(&store, std::sync::Arc::new(SlowAuthorizer(Duration::from_secs(5))))
        .with_deadline(Duration::from_millis(50));

    let err = engine
        .transfer(request("100.00", payer.id, payee.id))
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::TimedOut(_)));
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(store.orders().await.is_empty());
    assert_eq!(store.account(payer.id).await.unwrap().balance, decimal("1000.00"));
}

#[tokio::test]
async fn test_find_by_id_round_trip() {
    let (store, payer, payee) = seeded_store("1000.00", "200.00").await;
    let engine = engine(&store, ScriptedAuthorizer::always(true));

    let order = engine
        .transfer(request("100.00", payer.id, payee.id))
        .await
        .unwrap();

    let found = engine.find_by_id(order.id).await.unwrap();
    assert_eq!(found, order);

    let err = engine.find_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, TransferError::OrderNotFound));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_order_store_insert_then_find() {
    let (store, payer, payee) = seeded_store("1.00", "1.00").await;
    let order = transfer_core::domain::Order::new(decimal("12.34"), payer.id, payee.id);

    let inserted = OrderStore::insert(&store, &order).await.unwrap();
    assert_eq!(inserted, order);
    assert_eq!(OrderStore::find_by_id(&store, order.id).await.unwrap(), order);
    assert!(matches!(
        OrderStore::find_by_id(&store, Uuid::new_v4()).await,
        Err(RepositoryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_balance_is_conserved() {
    let (store, payer, payee) = seeded_store("500.00", "75.50").await;
    let engine = engine(&store, ScriptedAuthorizer::always(true));
    let total = decimal("575.50");

    for amount in ["0.01", "10.00", "99.99", "250.00", "140.00"] {
        engine
            .transfer(request(amount, payer.id, payee.id))
            .await
            .unwrap();

        let payer_balance = store.account(payer.id).await.unwrap().balance;
        let payee_balance = store.account(payee.id).await.unwrap().balance;
        assert_eq!(payer_balance + payee_balance, total);
    }

    assert_eq!(store.orders().await.len(), 5);
    assert_eq!(store.account(payer.id).await.unwrap().balance, decimal("0.00"));
}

#[tokio::test]
async fn test_concurrent_transfers_never_overdraw() {
    let store = transfer_core::adapters::InMemoryStore::new();
    let payer = account("Pedro", "100.00", false);
    let payee = account("Maria", "0.00", false);
    store.insert_account(payer.clone()).await;
    store.insert_account(payee.clone()).await;
    let engine = engine(&store, ScriptedAuthorizer::always(true));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let engine = engine.clone();
            let req = request("30.00", payer.id, payee.id);
            tokio::spawn(async move { engine.transfer(req).await })
        })
        .collect();

    let mut committed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => committed += 1,
            Err(e) => assert!(matches!(e, TransferError::InsufficientBalance)),
        }
    }

    assert_eq!(committed, 3);
    assert_eq!(store.account(payer.id).await.unwrap().balance, decimal("10.00"));
    assert_eq!(store.account(payee.id).await.unwrap().balance, decimal("90.00"));
    assert_eq!(store.orders().await.len(), 3);
}
