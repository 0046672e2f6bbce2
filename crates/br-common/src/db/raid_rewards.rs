use deadpool_postgres::{GenericClient, PoolError};
use tokio_postgres::Error as PgError;
use tracing::instrument;

use crate::db::util::TimedClientExt;
use crate::rewards::PlannedReward;

#[derive(Debug, thiserror::Error)]
pub enum RewardStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
}

/// Append one reward row.
///
/// Issuance runs inside the raid-completion transaction, which is the
/// primary exactly-once guard; `ON CONFLICT DO NOTHING` over the
/// `(raid_id, rider_id)` uniqueness is the constraint-level backstop, so a
/// replayed insert can never double-issue.
#[instrument(skip(client, reward), fields(rider_id = %reward.rider_id))]
pub async fn insert_reward<C>(
    client: &C,
    raid_id: i64,
    reward: &PlannedReward,
) -> Result<u64, RewardStorageError>
where
    C: GenericClient,
{
    let rows = client
        .timed_execute_cached(
            "INSERT INTO raid.raid_rewards (
                raid_id, rider_id, rank, reward_type, reward_description
            ) VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (raid_id, rider_id) DO NOTHING;",
            &[
                &raid_id,
                &reward.rider_id,
                &reward.rank,
                &reward.reward_type.as_str(),
                &reward.description,
            ],
            "raid_rewards.insert",
        )
        .await?;

    Ok(rows)
}
