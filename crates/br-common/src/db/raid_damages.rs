use chrono::NaiveDate;
use deadpool_postgres::{GenericClient, PoolError};
use tokio_postgres::Error as PgError;
use tracing::instrument;

use crate::db::util::TimedClientExt;

#[derive(Debug, thiserror::Error)]
pub enum DamageStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
}

/// One staged ledger row, ready to upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct RaidDamageInsert {
    pub raid_id: i64,
    pub rider_id: String,
    pub damage_date: NaiveDate,
    pub base_damage: i64,
    pub bonus_multiplier: f64,
    pub total_damage: i64,
}

/// Upsert one ledger row keyed by `(raid_id, rider_id, damage_date)`.
///
/// Rerunning the accumulator for the same day recomputes and overwrites the
/// same row; it never appends a duplicate.
#[instrument(skip(client, damage), fields(raid_id = damage.raid_id, rider_id = %damage.rider_id))]
pub async fn upsert_raid_damage<C>(
    client: &C,
    damage: &RaidDamageInsert,
) -> Result<u64, DamageStorageError>
where
    C: GenericClient,
{
    let rows = client
        .timed_execute_cached(
            "INSERT INTO raid.raid_damages (
                raid_id, rider_id, damage_date,
                base_damage, bonus_multiplier, total_damage, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (raid_id, rider_id, damage_date) DO UPDATE SET
                base_damage = EXCLUDED.base_damage,
                bonus_multiplier = EXCLUDED.bonus_multiplier,
                total_damage = EXCLUDED.total_damage,
                updated_at = EXCLUDED.updated_at;",
            &[
                &damage.raid_id,
                &damage.rider_id,
                &damage.damage_date,
                &damage.base_damage,
                &damage.bonus_multiplier,
                &damage.total_damage,
            ],
            "raid_damages.upsert",
        )
        .await?;

    Ok(rows)
}

/// Read the full ledger for a raid as `(rider_id, total_damage)` pairs.
///
/// Aggregation happens in the ranking builder, not in SQL; the ranking is a
/// full re-reduction of the ledger each run.
pub async fn fetch_damage_rows<C>(
    client: &C,
    raid_id: i64,
) -> Result<Vec<(String, i64)>, DamageStorageError>
where
    C: GenericClient,
{
    let rows = client
        .timed_query(
            "SELECT rider_id, total_damage
             FROM raid.raid_damages
             WHERE raid_id = $1
             ORDER BY rider_id, damage_date",
            &[&raid_id],
            "raid_damages.fetch_rows",
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| (row.get(0), row.get(1)))
        .collect())
}
