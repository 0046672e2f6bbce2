//! Domain model for the boss-raid delivery contest.
//!
//! Plain structs mirroring the `raid.*` tables (see [`crate::schema`]). All
//! mutation goes through the db modules; these types carry no behavior beyond
//! enum/string conversions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 배달로그 1건: 한 라이더의 하루(구역 단위) 배달 활동.
///
/// Unique per `(rider_id, delivery_date)`; ingestion overwrites in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryLog {
    /// `BC` + 6 digits.
    pub rider_id: String,
    pub delivery_date: NaiveDate,
    pub delivery_count: i32,
    pub is_rainy: bool,
    pub has_surge: bool,
    pub district: String,
}

/// Raid lifecycle. `active → completed` is the only transition this engine
/// performs; `failed` exists as a terminal state but is never set here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaidStatus {
    Active,
    Completed,
    Failed,
}

impl RaidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RaidStatus::Active => "active",
            RaidStatus::Completed => "completed",
            RaidStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(RaidStatus::Active),
            "completed" => Some(RaidStatus::Completed),
            "failed" => Some(RaidStatus::Failed),
            _ => None,
        }
    }
}

/// 보스 속성 (연출용 분류; 스코어링에는 영향 없음).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BossType {
    Fire,
    Water,
    Earth,
    Wind,
}

impl BossType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BossType::Fire => "fire",
            BossType::Water => "water",
            BossType::Earth => "earth",
            BossType::Wind => "wind",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "fire" => Some(BossType::Fire),
            "water" => Some(BossType::Water),
            "earth" => Some(BossType::Earth),
            "wind" => Some(BossType::Wind),
            _ => None,
        }
    }
}

/// A time-boxed contest over one district.
///
/// `max_hp` is immutable after creation. `current_hp` is exclusively mutated
/// by the damage accumulator and is monotonically non-increasing while the
/// raid is `active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossRaid {
    pub id: i64,
    pub district: String,
    pub boss_name: String,
    pub boss_type: BossType,
    pub max_hp: i64,
    pub current_hp: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RaidStatus,
    pub buff_multiplier: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Opt-in join record. Created by the join action outside this engine;
/// read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaidParticipant {
    pub raid_id: i64,
    pub rider_id: String,
    pub rider_name: Option<String>,
    pub joined_at: DateTime<Utc>,
}

/// 보상 등급: 실물(real) / 가상(virtual) / 참여 배지(badge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardType {
    Real,
    Virtual,
    Badge,
}

impl RewardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardType::Real => "real",
            RewardType::Virtual => "virtual",
            RewardType::Badge => "badge",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "real" => Some(RewardType::Real),
            "virtual" => Some(RewardType::Virtual),
            "badge" => Some(RewardType::Badge),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [RaidStatus::Active, RaidStatus::Completed, RaidStatus::Failed] {
            assert_eq!(RaidStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RaidStatus::parse("archived"), None);
    }

    #[test]
    fn boss_type_round_trips_through_str() {
        for boss_type in [BossType::Fire, BossType::Water, BossType::Earth, BossType::Wind] {
            assert_eq!(BossType::parse(boss_type.as_str()), Some(boss_type));
        }
        assert_eq!(BossType::parse("ice"), None);
    }

    #[test]
    fn reward_type_round_trips_through_str() {
        for reward_type in [RewardType::Real, RewardType::Virtual, RewardType::Badge] {
            assert_eq!(RewardType::parse(reward_type.as_str()), Some(reward_type));
        }
        assert_eq!(RewardType::parse("cash"), None);
    }
}
