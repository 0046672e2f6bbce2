use deadpool_postgres::{GenericClient, PoolError};
use tokio_postgres::Error as PgError;
use tokio_postgres::Row;
use tracing::instrument;

use crate::db::util::TimedClientExt;
use crate::db::PgPool;
use crate::raid::{BossRaid, BossType, RaidStatus};

#[derive(Debug, thiserror::Error)]
pub enum RaidStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("failed to map raid row: {0}")]
    Mapping(String),
}

/// Fetch raids whose status is in `statuses`, oldest first.
pub async fn fetch_raids_by_status(
    pool: &PgPool,
    statuses: &[RaidStatus],
) -> Result<Vec<BossRaid>, RaidStorageError> {
    let status_strings: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();

    let client = pool.get().await?;
    let rows = client
        .timed_query(
            "SELECT id, district, boss_name, boss_type, max_hp, current_hp,
                    start_date, end_date, status, buff_multiplier,
                    created_at, updated_at
             FROM raid.boss_raids
             WHERE status = ANY($1)
             ORDER BY start_date, id",
            &[&status_strings],
            "boss_raids.fetch_by_status",
        )
        .await?;

    rows.iter().map(row_to_raid).collect()
}

/// Apply one run's damage delta to a raid, transitioning to `completed` when
/// the HP floor is reached.
///
/// The `status = 'active'` predicate is the exactly-once gate: only the run
/// that actually performs the `active → completed` transition sees an
/// affected-row count of 1, so reward issuance keyed on that count cannot
/// double-fire. Returns the affected-row count (0 means the raid changed
/// under us and nothing was written).
#[instrument(skip(client))]
pub async fn deduct_raid_hp<C>(
    client: &C,
    raid_id: i64,
    new_hp: i64,
    new_status: RaidStatus,
) -> Result<u64, RaidStorageError>
where
    C: GenericClient,
{
    let rows = client
        .timed_execute(
            "UPDATE raid.boss_raids
             SET current_hp = $2,
                 status = $3,
                 updated_at = NOW()
             WHERE id = $1
               AND status = 'active'",
            &[&raid_id, &new_hp, &new_status.as_str()],
            "boss_raids.deduct_hp",
        )
        .await?;

    Ok(rows)
}

fn row_to_raid(row: &Row) -> Result<BossRaid, RaidStorageError> {
    let status_raw: String = row.try_get("status")?;
    let status = RaidStatus::parse(&status_raw)
        .ok_or_else(|| RaidStorageError::Mapping(format!("unknown status: {status_raw}")))?;

    let boss_type_raw: String = row.try_get("boss_type")?;
    let boss_type = BossType::parse(&boss_type_raw)
        .ok_or_else(|| RaidStorageError::Mapping(format!("unknown boss_type: {boss_type_raw}")))?;

    Ok(BossRaid {
        id: row.try_get("id")?,
        district: row.try_get("district")?,
        boss_name: row.try_get("boss_name")?,
        boss_type,
        max_hp: row.try_get("max_hp")?,
        current_hp: row.try_get("current_hp")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        status,
        buff_multiplier: row.try_get("buff_multiplier")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
