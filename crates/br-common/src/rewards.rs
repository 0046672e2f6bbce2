//! Reward planner: ranking + participant set → tiered reward rows.
//!
//! Pure planning only. Exactly-once issuance is the accumulator's concern
//! (the plan is written inside the raid-completion transaction); this module
//! decides who gets which tier.

use std::collections::HashSet;

use crate::raid::RewardType;
use crate::ranking::RankedRider;

/// 1등 실물 보상 문구.
pub const FIRST_PLACE_REWARD: &str = "1등 보상: 스타벅스 기프티콘 5만원권";

/// 참여 배지 문구 (순위 보상을 받지 못한 전체 참여자 대상).
pub const PARTICIPATION_BADGE: &str = "레이드 참여 배지";

/// Ranks that receive a ranked reward (1등 real, 2~3등 virtual).
pub const RANKED_REWARD_TIERS: i32 = 3;

/// One reward row to append for a completed raid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedReward {
    pub rider_id: String,
    pub rank: Option<i32>,
    pub reward_type: RewardType,
    pub description: String,
}

/// Plan the rewards for a completed raid.
///
/// `ranking` must be ordered by rank ascending (as the ranking builder
/// emits it). Every participant receives at most one planned row: rank 1
/// gets the real reward, ranks 2..=3 a virtual tier badge, and every other
/// participant the participation badge. The exclusion set for badges is the
/// rank-1..3 recipients planned in this same invocation, not any persisted
/// reward state.
pub fn plan_rewards(ranking: &[RankedRider], participants: &[String]) -> Vec<PlannedReward> {
    let mut planned = Vec::with_capacity(participants.len().max(ranking.len().min(3)));
    let mut ranked_recipients: HashSet<&str> = HashSet::new();

    for entry in ranking.iter().take(RANKED_REWARD_TIERS as usize) {
        let (reward_type, description) = if entry.rank == 1 {
            (RewardType::Real, FIRST_PLACE_REWARD.to_string())
        } else {
            (RewardType::Virtual, format!("{}등 달성 배지", entry.rank))
        };

        ranked_recipients.insert(entry.rider_id.as_str());
        planned.push(PlannedReward {
            rider_id: entry.rider_id.clone(),
            rank: Some(entry.rank),
            reward_type,
            description,
        });
    }

    for rider_id in participants {
        if ranked_recipients.contains(rider_id.as_str()) {
            continue;
        }
        planned.push(PlannedReward {
            rider_id: rider_id.clone(),
            rank: None,
            reward_type: RewardType::Badge,
            description: PARTICIPATION_BADGE.to_string(),
        });
    }

    planned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(rider: &str, rank: i32, damage: i64) -> RankedRider {
        RankedRider {
            rider_id: rider.to_string(),
            total_damage: damage,
            rank,
        }
    }

    fn riders(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn full_tier_spread() {
        let ranking = vec![
            ranked("BC000001", 1, 900),
            ranked("BC000002", 2, 400),
            ranked("BC000003", 3, 100),
            ranked("BC000004", 4, 50),
        ];
        let participants = riders(&["BC000001", "BC000002", "BC000003", "BC000004", "BC000005"]);

        let planned = plan_rewards(&ranking, &participants);

        assert_eq!(planned.len(), 5);
        assert_eq!(planned[0].reward_type, RewardType::Real);
        assert_eq!(planned[0].rank, Some(1));
        assert_eq!(planned[0].description, FIRST_PLACE_REWARD);
        assert_eq!(planned[1].reward_type, RewardType::Virtual);
        assert_eq!(planned[1].description, "2등 달성 배지");
        assert_eq!(planned[2].reward_type, RewardType::Virtual);
        assert_eq!(planned[2].description, "3등 달성 배지");

        // 4등은 순위 보상 대상이 아니므로 참여 배지를 받는다.
        let fourth = planned.iter().find(|p| p.rider_id == "BC000004").unwrap();
        assert_eq!(fourth.reward_type, RewardType::Badge);
        assert_eq!(fourth.rank, None);

        let fifth = planned.iter().find(|p| p.rider_id == "BC000005").unwrap();
        assert_eq!(fifth.reward_type, RewardType::Badge);
    }

    #[test]
    fn at_most_one_reward_per_rider() {
        let ranking = vec![ranked("BC000001", 1, 10), ranked("BC000002", 2, 5)];
        let participants = riders(&["BC000001", "BC000002", "BC000003"]);

        let planned = plan_rewards(&ranking, &participants);

        let mut seen = HashSet::new();
        for reward in &planned {
            assert!(seen.insert(reward.rider_id.clone()), "{} rewarded twice", reward.rider_id);
        }
    }

    #[test]
    fn real_reward_exists_iff_rank_one_exists() {
        let with_ranking = plan_rewards(&[ranked("BC000001", 1, 10)], &riders(&["BC000001"]));
        assert_eq!(
            with_ranking.iter().filter(|r| r.reward_type == RewardType::Real).count(),
            1
        );

        let no_ranking = plan_rewards(&[], &riders(&["BC000001", "BC000002"]));
        assert!(no_ranking.iter().all(|r| r.reward_type == RewardType::Badge));
        assert_eq!(no_ranking.len(), 2);
    }

    #[test]
    fn fewer_than_three_ranked_riders() {
        let ranking = vec![ranked("BC000001", 1, 10), ranked("BC000002", 2, 5)];
        let planned = plan_rewards(&ranking, &riders(&["BC000001", "BC000002"]));

        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].reward_type, RewardType::Real);
        assert_eq!(planned[1].reward_type, RewardType::Virtual);
    }
}
