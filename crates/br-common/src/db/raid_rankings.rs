use deadpool_postgres::{GenericClient, PoolError};
use tokio_postgres::Error as PgError;
use tracing::instrument;

use crate::db::util::TimedClientExt;
use crate::ranking::RankedRider;
use crate::timezone::RAID_DATE_TIMEZONE;

#[derive(Debug, thiserror::Error)]
pub enum RankingStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
}

/// Upsert one standing, replacing `total_damage`, `rank`, and
/// `last_updated` wholesale. `last_updated` is the current calendar date in
/// the canonical raid timezone. Stale rows for riders who left the ledger
/// are left in place (the reconcile job reports them).
#[instrument(skip(client, entry), fields(rider_id = %entry.rider_id, rank = entry.rank))]
pub async fn upsert_ranking<C>(
    client: &C,
    raid_id: i64,
    entry: &RankedRider,
) -> Result<u64, RankingStorageError>
where
    C: GenericClient,
{
    let rows = client
        .timed_execute_cached(
            "INSERT INTO raid.raid_rankings (
                raid_id, rider_id, total_damage, rank, last_updated
            ) VALUES ($1, $2, $3, $4, (NOW() AT TIME ZONE $5)::date)
            ON CONFLICT (raid_id, rider_id) DO UPDATE SET
                total_damage = EXCLUDED.total_damage,
                rank = EXCLUDED.rank,
                last_updated = EXCLUDED.last_updated;",
            &[
                &raid_id,
                &entry.rider_id,
                &entry.total_damage,
                &entry.rank,
                &RAID_DATE_TIMEZONE,
            ],
            "raid_rankings.upsert",
        )
        .await?;

    Ok(rows)
}
