use std::path::PathBuf;

use clap::Parser;
use dotenvy::dotenv;
use tracing::info;

use br_common::db::{create_pool_from_url, run_migrations, DbPoolError, MigrationError};
use br_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use br_common::run_id;
use br_common::source::{SheetExport, SourceError};
use br_common::sync::{run_sync, SyncError};

#[derive(Debug, Parser)]
#[command(
    name = "br-raid-sync",
    about = "보스 레이드 배달로그 동기화 배치 (sheet export → raid store)"
)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    db_url: String,

    /// Path to the 배달로그 sheet export JSON dumped by the spreadsheet glue
    #[arg(long, env = "RAID_SHEET_EXPORT")]
    sheet_export: PathBuf,

    /// Skip applying schema migrations before the run
    #[arg(long, env = "BR_SKIP_MIGRATIONS")]
    skip_migrations: bool,
}

#[derive(Debug, thiserror::Error)]
enum BatchError {
    #[error("database pool error: {0}")]
    DbPool(#[from] DbPoolError),
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),
    #[error("sheet export error: {0}")]
    Source(#[from] SourceError),
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),
}

async fn run() -> Result<(), BatchError> {
    dotenv().ok();
    install_tracing_panic_hook("br-raid-sync");
    init_tracing_subscriber("br-raid-sync");

    let cli = Cli::parse();
    let pool = create_pool_from_url(&cli.db_url, "br-raid-sync")?;

    if !cli.skip_migrations {
        run_migrations(&pool).await?;
    }

    info!(
        sync_run_id = run_id::get(),
        export = %cli.sheet_export.display(),
        "starting raid sync run"
    );

    // The export must load before anything is touched; a broken dump means
    // the run never starts.
    let export = SheetExport::from_path(&cli.sheet_export)?;
    let report = run_sync(&pool, &export).await?;

    // Per-row and per-raid failures are inside the report and do not affect
    // the exit code; only top-level failures do.
    println!("{report}");
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("br-raid-sync failed: {err}");
        std::process::exit(1);
    }
}
