use deadpool_postgres::PoolError;
use tokio_postgres::Error as PgError;
use tokio_postgres::Row;

use crate::db::util::TimedClientExt;
use crate::db::PgPool;
use crate::raid::RaidParticipant;

#[derive(Debug, thiserror::Error)]
pub enum ParticipantStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
}

/// Riders who joined a raid, in join order.
///
/// Participation is an explicit opt-in recorded outside this engine; the
/// sync only ever reads it.
pub async fn fetch_participants(
    pool: &PgPool,
    raid_id: i64,
) -> Result<Vec<RaidParticipant>, ParticipantStorageError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query(
            "SELECT raid_id, rider_id, rider_name, joined_at
             FROM raid.raid_participants
             WHERE raid_id = $1
             ORDER BY joined_at, rider_id",
            &[&raid_id],
            "raid_participants.fetch",
        )
        .await?;

    Ok(rows.iter().map(row_to_participant).collect::<Result<_, _>>()?)
}

fn row_to_participant(row: &Row) -> Result<RaidParticipant, PgError> {
    Ok(RaidParticipant {
        raid_id: row.try_get("raid_id")?,
        rider_id: row.try_get("rider_id")?,
        rider_name: row.try_get("rider_name")?,
        joined_at: row.try_get("joined_at")?,
    })
}
