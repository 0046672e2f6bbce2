//! Advisory reconciliation report for the raid store.
//!
//! The sync engine never deletes state, so drift accumulates in three known
//! places: ranking rows whose rider has left the damage ledger, participants
//! who never dealt damage, and raids still `active` past their end date.
//! This job reports that drift and mutates nothing.

use chrono::NaiveDate;
use clap::Parser;
use dotenvy::dotenv;
use tracing::{info, warn};

use br_common::db::{create_pool_from_url, DbPoolError, PgPool};
use br_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use br_common::timezone::RAID_DATE_TIMEZONE;

#[derive(Debug, Parser)]
#[command(
    name = "br-reconcile",
    about = "Read-only drift report over the raid store"
)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    db_url: String,
}

#[derive(Debug, thiserror::Error)]
enum ReconcileError {
    #[error("database pool error: {0}")]
    DbPool(#[from] DbPoolError),
    #[error("postgres pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}

/// `(raid_id, rider_id)` pair present in one table, absent in another.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OrphanPair {
    raid_id: i64,
    rider_id: String,
}

/// Pairs in `present` with no counterpart in `ledger`.
fn pairs_missing_from_ledger(
    present: &[(i64, String)],
    ledger: &[(i64, String)],
) -> Vec<OrphanPair> {
    use std::collections::HashSet;

    let ledger_keys: HashSet<(i64, &str)> = ledger
        .iter()
        .map(|(raid_id, rider_id)| (*raid_id, rider_id.as_str()))
        .collect();

    present
        .iter()
        .filter(|(raid_id, rider_id)| !ledger_keys.contains(&(*raid_id, rider_id.as_str())))
        .map(|(raid_id, rider_id)| OrphanPair {
            raid_id: *raid_id,
            rider_id: rider_id.clone(),
        })
        .collect()
}

/// Raids still `active` strictly after their end date.
fn overdue_raids(
    raids: &[(i64, String, NaiveDate)],
    today: NaiveDate,
) -> Vec<(i64, String, NaiveDate)> {
    raids
        .iter()
        .filter(|(_, _, end_date)| *end_date < today)
        .cloned()
        .collect()
}

async fn fetch_pairs(pool: &PgPool, sql: &str) -> Result<Vec<(i64, String)>, ReconcileError> {
    let client = pool.get().await?;
    let rows = client.query(sql, &[]).await?;
    Ok(rows.iter().map(|row| (row.get(0), row.get(1))).collect())
}

async fn run() -> Result<(), ReconcileError> {
    dotenv().ok();
    install_tracing_panic_hook("br-reconcile");
    init_tracing_subscriber("br-reconcile");

    let cli = Cli::parse();
    let pool = create_pool_from_url(&cli.db_url, "br-reconcile")?;

    let rankings = fetch_pairs(&pool, "SELECT raid_id, rider_id FROM raid.raid_rankings").await?;
    let participants =
        fetch_pairs(&pool, "SELECT raid_id, rider_id FROM raid.raid_participants").await?;
    let ledger =
        fetch_pairs(&pool, "SELECT DISTINCT raid_id, rider_id FROM raid.raid_damages").await?;

    let client = pool.get().await?;
    let today: NaiveDate = client
        .query_one("SELECT (NOW() AT TIME ZONE $1)::date", &[&RAID_DATE_TIMEZONE])
        .await?
        .get(0);
    let active_rows = client
        .query(
            "SELECT id, district, end_date FROM raid.boss_raids WHERE status = 'active'",
            &[],
        )
        .await?;
    let active: Vec<(i64, String, NaiveDate)> = active_rows
        .iter()
        .map(|row| (row.get(0), row.get(1), row.get(2)))
        .collect();

    let stale_rankings = pairs_missing_from_ledger(&rankings, &ledger);
    let idle_participants = pairs_missing_from_ledger(&participants, &ledger);
    let overdue = overdue_raids(&active, today);

    for pair in &stale_rankings {
        warn!(
            raid_id = pair.raid_id,
            rider_id = %pair.rider_id,
            "ranking row has no ledger backing"
        );
    }
    for pair in &idle_participants {
        info!(
            raid_id = pair.raid_id,
            rider_id = %pair.rider_id,
            "participant has dealt no damage"
        );
    }
    for (raid_id, district, end_date) in &overdue {
        warn!(raid_id, %district, %end_date, "raid still active past end date");
    }

    println!(
        "reconcile report: {} stale ranking rows, {} idle participants, {} overdue raids",
        stale_rankings.len(),
        idle_participants.len(),
        overdue.len()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("br-reconcile failed: {err}");
        std::process::exit(1);
    }
}
