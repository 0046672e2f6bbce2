pub mod boss_raids;
pub mod delivery_logs;
pub mod migrations;
pub mod pool;
pub mod raid_damages;
pub mod raid_participants;
pub mod raid_rankings;
pub mod raid_rewards;
pub mod util;

// Keep re-exports unique so downstream crates see a single symbol per helper.
pub use boss_raids::{deduct_raid_hp, fetch_raids_by_status, RaidStorageError};
pub use delivery_logs::{
    fetch_logs_for_raid, upsert_delivery_log, DeliveryLogStorageError,
};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool_from_url, DbPoolError, PgPool};
pub use raid_damages::{
    fetch_damage_rows, upsert_raid_damage, DamageStorageError, RaidDamageInsert,
};
pub use raid_participants::{fetch_participants, ParticipantStorageError};
pub use raid_rankings::{upsert_ranking, RankingStorageError};
pub use raid_rewards::{insert_reward, RewardStorageError};
pub use util::TimedClientExt;
