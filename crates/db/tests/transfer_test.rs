//! Integration tests for the transfer service.
//!
//! These run against a migrated Postgres instance and are skipped when
//! `DATABASE_URL` is not set.

use std::env;

use remvio_db::repositories::{TransferError, TransferFilter, TransferService};
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
async fn test_get_unknown_transfer_is_not_found() {
    let Some(db) = connect_or_skip().await else {
        return;
    };

    let service = TransferService::new(db, Uuid::new_v4(), remvio_shared::TransferConfig::default());
    let result = service.get_with_charges(Uuid::new_v4()).await;

    assert!(matches!(result, Err(TransferError::NotFound(_))));
}

#[tokio::test]
async fn test_list_for_unknown_org_is_empty() {
    let Some(db) = connect_or_skip().await else {
        return;
    };

    let service = TransferService::new(db, Uuid::new_v4(), remvio_shared::TransferConfig::default());
    let filter = TransferFilter {
        origin_org_id: Some(Uuid::new_v4()),
        ..TransferFilter::default()
    };
    let transfers = service.list(filter).await.expect("list should succeed");

    assert!(transfers.is_empty());
}

#[tokio::test]
async fn test_approve_unknown_transfer_is_not_found() {
    let Some(db) = connect_or_skip().await else {
        return;
    };

    let service = TransferService::new(db, Uuid::new_v4(), remvio_shared::TransferConfig::default());
    let actor = remvio_shared::Actor::user(Uuid::new_v4());
    let result = service.approve_outbound(Uuid::new_v4(), &actor).await;

    assert!(matches!(result, Err(TransferError::NotFound(_))));
}
