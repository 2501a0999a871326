//! Integration tests for the float ledger repository.
//!
//! These run against a migrated Postgres instance and are skipped when
//! `DATABASE_URL` is not set.

use std::env;

use remvio_db::repositories::FloatLedgerRepository;
use remvio_shared::Actor;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

async fn connect_or_skip() -> Option<DatabaseConnection> {
    let Ok(url) = env::var("DATABASE_URL") else {
        eprintln!("skipping: DATABASE_URL not set");
        return None;
    };
    Some(
        remvio_db::connect(&url)
            .await
            .expect("Failed to connect to database"),
    )
}

#[tokio::test]
async fn test_close_period_for_unknown_pair_is_empty() {
    let Some(db) = connect_or_skip().await else {
        return;
    };

    let repo = FloatLedgerRepository::new(db);
    let outcomes = repo
        .close_period(Uuid::new_v4(), Uuid::new_v4(), &Actor::system())
        .await
        .expect("close_period should succeed with no balances");

    assert!(outcomes.is_empty());
}

#[tokio::test]
async fn test_withdraw_from_unfunded_float_fails() {
    let Some(db) = connect_or_skip().await else {
        return;
    };

    let repo = FloatLedgerRepository::new(db);
    let result = repo
        .withdraw(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            rust_decimal::Decimal::ONE,
            "test withdrawal",
            &Actor::system(),
        )
        .await;

    assert!(result.is_err());
}
