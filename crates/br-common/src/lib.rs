pub mod damage;
pub mod db;
pub mod ingest;
pub mod logging;
pub mod raid;
pub mod ranking;
pub mod rewards;
pub mod run_id;
pub mod schema;
pub mod source;
pub mod sync;
pub mod timezone;

pub use raid::{
    BossRaid, BossType, DeliveryLog, RaidParticipant, RaidStatus, RewardType,
};
