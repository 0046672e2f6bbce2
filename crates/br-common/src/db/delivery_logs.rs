use chrono::NaiveDate;
use deadpool_postgres::PoolError;
use tokio_postgres::Error as PgError;
use tokio_postgres::Row;
use tracing::instrument;

use crate::db::util::TimedClientExt;
use crate::db::PgPool;
use crate::raid::{BossRaid, DeliveryLog};

#[derive(Debug, thiserror::Error)]
pub enum DeliveryLogStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
}

/// Upsert one delivery log keyed by `(rider_id, delivery_date)`.
///
/// A corrected source row fully replaces the stored one: count, weather
/// flags, and district are all overwritten, and `synced_at` is bumped.
#[instrument(skip(pool, log), fields(rider_id = %log.rider_id, delivery_date = %log.delivery_date))]
pub async fn upsert_delivery_log(
    pool: &PgPool,
    log: &DeliveryLog,
) -> Result<u64, DeliveryLogStorageError> {
    let client = pool.get().await?;

    let rows = client
        .timed_execute_cached(
            "INSERT INTO raid.delivery_logs (
                rider_id, delivery_date, delivery_count,
                is_rainy, has_surge, district, synced_at
            ) VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (rider_id, delivery_date) DO UPDATE SET
                delivery_count = EXCLUDED.delivery_count,
                is_rainy = EXCLUDED.is_rainy,
                has_surge = EXCLUDED.has_surge,
                district = EXCLUDED.district,
                synced_at = EXCLUDED.synced_at;",
            &[
                &log.rider_id,
                &log.delivery_date,
                &log.delivery_count,
                &log.is_rainy,
                &log.has_surge,
                &log.district,
            ],
            "delivery_logs.upsert",
        )
        .await?;

    Ok(rows)
}

/// Fetch the logs a raid scores: participant riders only, the raid's
/// district, delivery date inside the raid window (inclusive both ends).
pub async fn fetch_logs_for_raid(
    pool: &PgPool,
    raid: &BossRaid,
    participant_ids: &[String],
) -> Result<Vec<DeliveryLog>, DeliveryLogStorageError> {
    if participant_ids.is_empty() {
        return Ok(Vec::new());
    }

    let client = pool.get().await?;
    let rows = client
        .timed_query(
            "SELECT rider_id, delivery_date, delivery_count, is_rainy, has_surge, district
             FROM raid.delivery_logs
             WHERE rider_id = ANY($1)
               AND district = $2
               AND delivery_date >= $3
               AND delivery_date <= $4
             ORDER BY delivery_date, rider_id",
            &[
                &participant_ids,
                &raid.district,
                &raid.start_date,
                &raid.end_date,
            ],
            "delivery_logs.fetch_for_raid",
        )
        .await?;

    Ok(rows.iter().map(row_to_log).collect::<Result<_, _>>()?)
}

fn row_to_log(row: &Row) -> Result<DeliveryLog, PgError> {
    Ok(DeliveryLog {
        rider_id: row.try_get("rider_id")?,
        delivery_date: row.try_get::<_, NaiveDate>("delivery_date")?,
        delivery_count: row.try_get("delivery_count")?,
        is_rainy: row.try_get("is_rainy")?,
        has_surge: row.try_get("has_surge")?,
        district: row.try_get("district")?,
    })
}
