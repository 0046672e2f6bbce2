//! Sync orchestration: one run-to-completion pass over the whole contest.
//!
//! Stage order follows the data flow: delivery logs in, damage + HP per
//! active raid, then a ranking rebuild for every queryable raid. Raids are
//! processed sequentially; one raid's failure is reported and the run moves
//! on.

pub mod accumulator;

pub use accumulator::{
    accumulate_raid, next_hp, stage_damage_rows, AccumulateError, RaidOutcome,
};

use serde::Serialize;
use std::fmt;
use tracing::{info, instrument, warn};

use crate::db::{
    fetch_damage_rows, fetch_raids_by_status, upsert_delivery_log, upsert_ranking,
    DamageStorageError, PgPool, RaidStorageError, RankingStorageError,
};
use crate::ingest::{validate_rows, RowOutcome};
use crate::raid::{BossRaid, RaidStatus};
use crate::ranking::build_ranking;
use crate::run_id;
use crate::source::{SheetExport, SourceError};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("sheet export error: {0}")]
    Source(#[from] SourceError),
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("failed to fetch raids: {0}")]
    Raids(#[from] RaidStorageError),
    #[error("failed to read damage ledger: {0}")]
    Damage(#[from] DamageStorageError),
    #[error("failed to write ranking: {0}")]
    Ranking(#[from] RankingStorageError),
}

/// 배달로그 동기화 집계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LogCounters {
    pub synced: u32,
    /// Store write failures (row skipped, run continued).
    pub failed: u32,
    /// Validation rejections (bad rider id / date / count).
    pub rejected: u32,
    pub skipped_blank: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RankingCounters {
    pub raids_ranked: u32,
    pub rows_written: u64,
}

/// Everything a run did, for the log tail and the batch caller.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub run_id: String,
    pub logs: LogCounters,
    pub raids: Vec<RaidOutcome>,
    /// Raids whose unit rolled back this run.
    pub failed_raids: Vec<i64>,
    pub rankings: RankingCounters,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run {}", self.run_id)?;
        writeln!(
            f,
            "delivery logs: {} synced, {} failed, {} rejected, {} blank",
            self.logs.synced, self.logs.failed, self.logs.rejected, self.logs.skipped_blank
        )?;
        for outcome in &self.raids {
            writeln!(
                f,
                "raid {} ({} - {}): dealt {}, hp {}{}",
                outcome.raid_id,
                outcome.district,
                outcome.boss_name,
                outcome.total_damage_dealt,
                outcome.new_hp,
                if outcome.completed {
                    format!(", completed ({} rewards)", outcome.rewards_issued)
                } else {
                    String::new()
                }
            )?;
        }
        for raid_id in &self.failed_raids {
            writeln!(f, "raid {raid_id}: FAILED (rolled back)")?;
        }
        write!(
            f,
            "rankings: {} raids, {} rows",
            self.rankings.raids_ranked, self.rankings.rows_written
        )
    }
}

/// Full pipeline: ingest → accumulate (+ complete + reward) → rank.
#[instrument(skip(pool, export), fields(sync_run_id = run_id::get()))]
pub async fn run_sync(pool: &PgPool, export: &SheetExport) -> Result<SyncReport, SyncError> {
    info!(
        sheet = %export.title,
        rows = export.rows.len(),
        "보스 레이드 동기화 시작"
    );

    let logs = sync_delivery_logs(pool, export).await?;
    let (raids, failed_raids) = accumulate_active_raids(pool).await?;
    let rankings = rebuild_rankings(pool).await?;

    let report = SyncReport {
        run_id: run_id::get().to_string(),
        logs,
        raids,
        failed_raids,
        rankings,
    };

    info!(
        synced = report.logs.synced,
        failed = report.logs.failed,
        raids = report.raids.len(),
        failed_raids = report.failed_raids.len(),
        "보스 레이드 동기화 완료"
    );
    Ok(report)
}

/// Stage 1: validate and upsert the export's rows. Row-level problems are
/// logged with sheet context and counted; they never abort the stage.
pub async fn sync_delivery_logs(
    pool: &PgPool,
    export: &SheetExport,
) -> Result<LogCounters, SyncError> {
    let map = export.column_map()?;
    let mut counters = LogCounters::default();

    for outcome in validate_rows(export.raw_rows(map)) {
        match outcome {
            RowOutcome::Blank => counters.skipped_blank += 1,
            RowOutcome::Rejected {
                row_number,
                rejection,
            } => {
                warn!(row = row_number, reason = %rejection, "배달로그 행 거부");
                counters.rejected += 1;
            }
            RowOutcome::Valid(log) => match upsert_delivery_log(pool, &log).await {
                Ok(_) => counters.synced += 1,
                Err(err) => {
                    warn!(
                        rider_id = %log.rider_id,
                        delivery_date = %log.delivery_date,
                        error = %err,
                        "배달로그 동기화 실패"
                    );
                    counters.failed += 1;
                }
            },
        }
    }

    info!(
        synced = counters.synced,
        failed = counters.failed,
        rejected = counters.rejected,
        "배달로그 동기화 단계 완료"
    );
    Ok(counters)
}

/// Stage 2: run the accumulator over every active raid. A raid that fails
/// rolls back as a unit and is listed in the report; the loop keeps going.
async fn accumulate_active_raids(
    pool: &PgPool,
) -> Result<(Vec<RaidOutcome>, Vec<i64>), SyncError> {
    let raids = fetch_raids_by_status(pool, &[RaidStatus::Active]).await?;
    info!(count = raids.len(), "활성 레이드 처리");

    let mut outcomes = Vec::with_capacity(raids.len());
    let mut failed = Vec::new();

    for raid in &raids {
        match accumulate_raid(pool, raid).await {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => {
                warn!(raid_id = raid.id, error = %err, "레이드 처리 실패; 다음 레이드 계속");
                failed.push(raid.id);
            }
        }
    }

    Ok((outcomes, failed))
}

/// Stage 3: full ranking rebuild for every raid still queryable (active or
/// completed). Re-ranking a raid completed this run is a no-op rewrite of
/// the same standings.
async fn rebuild_rankings(pool: &PgPool) -> Result<RankingCounters, SyncError> {
    let raids =
        fetch_raids_by_status(pool, &[RaidStatus::Active, RaidStatus::Completed]).await?;
    let mut counters = RankingCounters::default();

    for raid in &raids {
        match rebuild_raid_ranking(pool, raid).await {
            Ok(rows) => {
                counters.raids_ranked += 1;
                counters.rows_written += rows;
            }
            Err(err) => {
                warn!(raid_id = raid.id, error = %err, "랭킹 갱신 실패; 다음 레이드 계속");
            }
        }
    }

    info!(
        raids = counters.raids_ranked,
        rows = counters.rows_written,
        "랭킹 갱신 완료"
    );
    Ok(counters)
}

/// One raid's standings replace as a unit: the ledger read and every row
/// write share a transaction, so a reader never sees a half-rewritten
/// ranking.
async fn rebuild_raid_ranking(pool: &PgPool, raid: &BossRaid) -> Result<u64, SyncError> {
    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    let ledger = fetch_damage_rows(&tx, raid.id).await?;
    let ranking = build_ranking(&ledger);

    let mut rows = 0;
    for entry in &ranking {
        rows += upsert_ranking(&tx, raid.id, entry).await?;
    }

    tx.commit().await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_renders_counts_and_raid_lines() {
        let report = SyncReport {
            run_id: "01JCEXAMPLE0000000000000000".into(),
            logs: LogCounters {
                synced: 12,
                failed: 1,
                rejected: 2,
                skipped_blank: 3,
            },
            raids: vec![RaidOutcome {
                raid_id: 7,
                district: "강남구".into(),
                boss_name: "불꽃 드래곤".into(),
                damage_rows: 4,
                total_damage_dealt: 150,
                new_hp: 0,
                completed: true,
                rewards_issued: 5,
            }],
            failed_raids: vec![9],
            rankings: RankingCounters {
                raids_ranked: 2,
                rows_written: 6,
            },
        };

        let rendered = report.to_string();
        assert!(rendered.contains("12 synced"));
        assert!(rendered.contains("raid 7 (강남구 - 불꽃 드래곤)"));
        assert!(rendered.contains("completed (5 rewards)"));
        assert!(rendered.contains("raid 9: FAILED"));
        assert!(rendered.contains("2 raids, 6 rows"));
    }

    #[test]
    fn report_serializes_for_machine_consumers() {
        let report = SyncReport {
            run_id: "01JCEXAMPLE0000000000000000".into(),
            logs: LogCounters::default(),
            raids: Vec::new(),
            failed_raids: Vec::new(),
            rankings: RankingCounters::default(),
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["logs"]["synced"], 0);
        assert!(value["raids"].as_array().unwrap().is_empty());
    }
}
