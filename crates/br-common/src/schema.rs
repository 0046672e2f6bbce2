//! DDL for the `raid` schema.
//!
//! Kept as constants so migrations, docs, and tests reference one source of
//! truth for table shape and constraints.

/// DDL-1: 배달로그. Upsert target of the ingestor; unique per rider/day.
pub const DELIVERY_LOGS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS raid.delivery_logs (
    id BIGSERIAL PRIMARY KEY,
    rider_id VARCHAR(8) NOT NULL,
    delivery_date DATE NOT NULL,
    delivery_count INTEGER NOT NULL,
    is_rainy BOOLEAN NOT NULL DEFAULT false,
    has_surge BOOLEAN NOT NULL DEFAULT false,
    district TEXT NOT NULL DEFAULT '',
    synced_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_delivery_logs_rider_date UNIQUE (rider_id, delivery_date),
    CONSTRAINT chk_delivery_count CHECK (delivery_count >= 0),
    CONSTRAINT chk_rider_id_format CHECK (rider_id ~ '^BC[0-9]{6}$')
);

CREATE INDEX IF NOT EXISTS idx_delivery_logs_district_date
    ON raid.delivery_logs(district, delivery_date);
CREATE INDEX IF NOT EXISTS idx_delivery_logs_rider
    ON raid.delivery_logs(rider_id, delivery_date);
"#;

/// DDL-2: 보스 레이드. `current_hp` only ever moves down while active.
pub const BOSS_RAIDS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS raid.boss_raids (
    id BIGSERIAL PRIMARY KEY,
    district TEXT NOT NULL,
    boss_name TEXT NOT NULL,
    boss_type VARCHAR(10) NOT NULL,
    max_hp BIGINT NOT NULL,
    current_hp BIGINT NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'active',
    buff_multiplier DOUBLE PRECISION NOT NULL DEFAULT 1.0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_boss_type CHECK (boss_type IN ('fire', 'water', 'earth', 'wind')),
    CONSTRAINT chk_status CHECK (status IN ('active', 'completed', 'failed')),
    CONSTRAINT chk_max_hp CHECK (max_hp > 0),
    CONSTRAINT chk_current_hp CHECK (current_hp >= 0 AND current_hp <= max_hp),
    CONSTRAINT chk_buff_multiplier CHECK (buff_multiplier >= 1.0),
    CONSTRAINT chk_raid_window CHECK (start_date <= end_date)
);

CREATE INDEX IF NOT EXISTS idx_boss_raids_status ON raid.boss_raids(status, end_date);
CREATE INDEX IF NOT EXISTS idx_boss_raids_district ON raid.boss_raids(district);
"#;

/// DDL-3: 레이드 참여자 (join은 외부 액션; 이 엔진은 읽기 전용).
pub const RAID_PARTICIPANTS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS raid.raid_participants (
    id BIGSERIAL PRIMARY KEY,
    raid_id BIGINT NOT NULL REFERENCES raid.boss_raids(id),
    rider_id VARCHAR(8) NOT NULL,
    rider_name TEXT,
    joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_raid_participants UNIQUE (raid_id, rider_id)
);

CREATE INDEX IF NOT EXISTS idx_raid_participants_raid ON raid.raid_participants(raid_id);
"#;

/// DDL-4: 데미지 원장. `(raid_id, rider_id, damage_date)` is the idempotency
/// key for accumulator reruns.
pub const RAID_DAMAGES_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS raid.raid_damages (
    id BIGSERIAL PRIMARY KEY,
    raid_id BIGINT NOT NULL REFERENCES raid.boss_raids(id),
    rider_id VARCHAR(8) NOT NULL,
    damage_date DATE NOT NULL,
    base_damage BIGINT NOT NULL,
    bonus_multiplier DOUBLE PRECISION NOT NULL,
    total_damage BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_raid_damages_key UNIQUE (raid_id, rider_id, damage_date),
    CONSTRAINT chk_base_damage CHECK (base_damage >= 0),
    CONSTRAINT chk_total_damage CHECK (total_damage >= 0)
);

CREATE INDEX IF NOT EXISTS idx_raid_damages_raid ON raid.raid_damages(raid_id, rider_id);
"#;

/// DDL-5: 랭킹 (파생 뷰; 매 실행 전체 재계산).
pub const RAID_RANKINGS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS raid.raid_rankings (
    id BIGSERIAL PRIMARY KEY,
    raid_id BIGINT NOT NULL REFERENCES raid.boss_raids(id),
    rider_id VARCHAR(8) NOT NULL,
    total_damage BIGINT NOT NULL,
    rank INTEGER NOT NULL,
    last_updated DATE NOT NULL,

    CONSTRAINT uq_raid_rankings_key UNIQUE (raid_id, rider_id),
    CONSTRAINT chk_rank CHECK (rank >= 1)
);

CREATE INDEX IF NOT EXISTS idx_raid_rankings_raid_rank ON raid.raid_rankings(raid_id, rank);
"#;

/// DDL-6: 보상 발급 기록 (append-only). The UNIQUE pair constraint is the
/// backstop for exactly-once issuance; the primary guard is the completion
/// transaction.
pub const RAID_REWARDS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS raid.raid_rewards (
    id BIGSERIAL PRIMARY KEY,
    raid_id BIGINT NOT NULL REFERENCES raid.boss_raids(id),
    rider_id VARCHAR(8) NOT NULL,
    rank INTEGER,
    reward_type VARCHAR(10) NOT NULL,
    reward_description TEXT NOT NULL,
    issued_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_raid_rewards_rider UNIQUE (raid_id, rider_id),
    CONSTRAINT chk_reward_type CHECK (reward_type IN ('real', 'virtual', 'badge')),
    CONSTRAINT chk_reward_rank CHECK (rank IS NULL OR rank >= 1)
);
"#;
