//! Raid damage accumulator: delivery logs → ledger rows → boss HP.
//!
//! Each raid is processed as one unit: damage rows, the HP deduction, and
//! (on completion) the ranking rebuild plus reward issuance all commit in a
//! single transaction, or none of them do. The `status = 'active'` predicate
//! on the HP update is what makes the `active → completed` transition (and
//! with it, reward issuance) happen exactly once.

use deadpool_postgres::GenericClient;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::damage::compute_damage;
use crate::db::{
    deduct_raid_hp, fetch_damage_rows, fetch_logs_for_raid, fetch_participants,
    insert_reward, upsert_raid_damage, upsert_ranking, DamageStorageError,
    DeliveryLogStorageError, ParticipantStorageError, PgPool, RaidDamageInsert,
    RaidStorageError, RankingStorageError, RewardStorageError,
};
use crate::raid::{BossRaid, DeliveryLog, RaidStatus};
use crate::ranking::build_ranking;
use crate::rewards::plan_rewards;

#[derive(Debug, thiserror::Error)]
pub enum AccumulateError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("failed to load participants: {0}")]
    Participants(#[from] ParticipantStorageError),
    #[error("failed to load delivery logs: {0}")]
    Logs(#[from] DeliveryLogStorageError),
    #[error("failed to write damage row: {0}")]
    Damage(#[from] DamageStorageError),
    #[error("failed to update raid hp: {0}")]
    Raid(#[from] RaidStorageError),
    #[error("failed to write ranking: {0}")]
    Ranking(#[from] RankingStorageError),
    #[error("failed to issue reward: {0}")]
    Reward(#[from] RewardStorageError),
    #[error("raid {0} was no longer active at commit time")]
    RaidNotActive(i64),
}

/// Per-raid outcome for the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaidOutcome {
    pub raid_id: i64,
    pub district: String,
    pub boss_name: String,
    /// Ledger rows recomputed this pass.
    pub damage_rows: usize,
    /// The delta applied this run, not the ledger's running total.
    pub total_damage_dealt: i64,
    pub new_hp: i64,
    pub completed: bool,
    pub rewards_issued: usize,
}

impl RaidOutcome {
    fn untouched(raid: &BossRaid) -> Self {
        Self {
            raid_id: raid.id,
            district: raid.district.clone(),
            boss_name: raid.boss_name.clone(),
            damage_rows: 0,
            total_damage_dealt: 0,
            new_hp: raid.current_hp,
            completed: false,
            rewards_issued: 0,
        }
    }
}

/// HP after one run's delta; floors at zero.
///
/// The deduction is a one-way ratchet: the delta is what this pass computed,
/// and a ledger row later corrected downward is never reconciled against HP
/// already deducted.
pub fn next_hp(current_hp: i64, total_damage_dealt: i64) -> i64 {
    (current_hp - total_damage_dealt).max(0)
}

/// Score every eligible log against the raid's buff. Pure staging; nothing
/// is written here.
pub fn stage_damage_rows(raid: &BossRaid, logs: &[DeliveryLog]) -> Vec<RaidDamageInsert> {
    logs.iter()
        .map(|log| {
            let breakdown = compute_damage(
                log.delivery_count,
                log.is_rainy,
                log.has_surge,
                raid.buff_multiplier,
            );
            RaidDamageInsert {
                raid_id: raid.id,
                rider_id: log.rider_id.clone(),
                damage_date: log.delivery_date,
                base_damage: breakdown.base_damage,
                bonus_multiplier: breakdown.bonus_multiplier,
                total_damage: breakdown.total_damage,
            }
        })
        .collect()
}

/// Run the accumulator for one active raid.
///
/// No participants or no eligible logs means no state change at all. A zero
/// damage delta writes the recomputed ledger rows but never touches HP or
/// `updated_at`.
#[instrument(skip(pool, raid), fields(raid_id = raid.id, district = %raid.district, boss = %raid.boss_name))]
pub async fn accumulate_raid(
    pool: &PgPool,
    raid: &BossRaid,
) -> Result<RaidOutcome, AccumulateError> {
    let participants = fetch_participants(pool, raid.id).await?;
    if participants.is_empty() {
        info!("참여자 없음; 레이드 건너뜀");
        return Ok(RaidOutcome::untouched(raid));
    }
    let participant_ids: Vec<String> = participants
        .iter()
        .map(|participant| participant.rider_id.clone())
        .collect();

    let logs = fetch_logs_for_raid(pool, raid, &participant_ids).await?;
    if logs.is_empty() {
        return Ok(RaidOutcome::untouched(raid));
    }

    let staged = stage_damage_rows(raid, &logs);
    let total_damage_dealt: i64 = staged.iter().map(|row| row.total_damage).sum();

    let mut outcome = RaidOutcome {
        damage_rows: staged.len(),
        total_damage_dealt,
        ..RaidOutcome::untouched(raid)
    };

    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    for row in &staged {
        upsert_raid_damage(&tx, row).await?;
    }

    if total_damage_dealt > 0 {
        let new_hp = next_hp(raid.current_hp, total_damage_dealt);
        let completed = new_hp == 0;
        let new_status = if completed {
            RaidStatus::Completed
        } else {
            raid.status
        };

        let affected = deduct_raid_hp(&tx, raid.id, new_hp, new_status).await?;
        if affected == 0 {
            // Raid changed under us between the fetch and the commit.
            warn!("raid no longer active; rolling back this raid's writes");
            tx.rollback().await?;
            return Err(AccumulateError::RaidNotActive(raid.id));
        }

        outcome.new_hp = new_hp;
        info!(
            total_damage_dealt,
            new_hp,
            max_hp = raid.max_hp,
            "데미지 반영"
        );

        if completed {
            outcome.completed = true;
            outcome.rewards_issued = complete_raid(&tx, raid, &participant_ids).await?;
        }
    }

    tx.commit().await?;
    Ok(outcome)
}

/// Completion path, inside the raid transaction: rebuild the ranking from
/// the ledger (which already contains this pass's rows) and issue the
/// planned rewards. Gated by the caller's affected-row check.
async fn complete_raid<C>(
    client: &C,
    raid: &BossRaid,
    participant_ids: &[String],
) -> Result<usize, AccumulateError>
where
    C: GenericClient,
{
    let ledger = fetch_damage_rows(client, raid.id).await?;
    let ranking = build_ranking(&ledger);

    for entry in &ranking {
        upsert_ranking(client, raid.id, entry).await?;
    }

    let planned = plan_rewards(&ranking, participant_ids);
    let mut issued = 0usize;
    for reward in &planned {
        issued += insert_reward(client, raid.id, reward).await? as usize;
    }

    info!(
        rewards_planned = planned.len(),
        rewards_issued = issued,
        "레이드 완료: 보상 발급"
    );
    Ok(issued)
}
