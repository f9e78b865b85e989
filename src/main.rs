#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vip_ledger::{
    config::{database, settings},
    context::Ledger,
    core::{investment, subscription},
    errors::Result,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load ledger settings and the VIP catalog
    let config = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!(
        currency = %config.ledger.default_currency,
        vip_levels = config.vip_levels.len(),
        "Configuration loaded."
    );

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    let ledger = Ledger::new(db, config.ledger);

    // 5. Seed the VIP catalog on first run
    subscription::seed_vip_levels(&ledger, &config.vip_levels)
        .await
        .inspect(|seeded| info!(seeded, "VIP catalog ready."))
        .inspect_err(|e| error!("Failed to seed VIP catalog: {}", e))?;

    // 6. Accrue everything that is due
    let summary = investment::accrue_due_investments(&ledger)
        .await
        .inspect_err(|e| error!("Accrual sweep failed: {}", e))?;
    info!(
        scanned = summary.scanned,
        accrued = summary.accrued,
        skipped = summary.skipped,
        failed = summary.failed,
        total_interest = %summary.total_interest,
        "Done."
    );

    Ok(())
}
