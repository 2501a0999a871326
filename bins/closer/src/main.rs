//! Monthly periodic float balance close job.
//!
//! Closes the current period of every ACTIVE organisation's float balances
//! (subject to the close window) and opens the next ones. Idempotent and
//! safe to re-trigger manually; per-organisation failures are tallied, not
//! fatal.
//!
//! Usage: cargo run --bin close-periods

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use remvio_db::repositories::{FloatLedgerRepository, OrganizationRepository};
use remvio_shared::{Actor, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "remvio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = remvio_db::connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    let organizations = OrganizationRepository::new(db.clone());
    let platform = organizations
        .find_platform()
        .await?
        .context("No platform organisation configured")?;

    let float_ledger = FloatLedgerRepository::new(db);
    let outcome = float_ledger.close_all(platform.id, &Actor::system()).await?;

    println!("{}", outcome.summary());
    for error in &outcome.errors {
        eprintln!("  failed: {error}");
    }

    if outcome.failed > 0 {
        anyhow::bail!("{} organisation(s) failed to close", outcome.failed);
    }
    Ok(())
}
