use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::{info, instrument};

use crate::db::PgPool;
use crate::schema;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migration: {0}")]
    Postgres(#[from] PgError),
}

struct Migration {
    id: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        id: 1,
        description: "delivery logs",
        sql: schema::DELIVERY_LOGS_DDL,
    },
    Migration {
        id: 2,
        description: "boss raids",
        sql: schema::BOSS_RAIDS_DDL,
    },
    Migration {
        id: 3,
        description: "raid participants",
        sql: schema::RAID_PARTICIPANTS_DDL,
    },
    Migration {
        id: 4,
        description: "raid damage ledger",
        sql: schema::RAID_DAMAGES_DDL,
    },
    Migration {
        id: 5,
        description: "raid rankings",
        sql: schema::RAID_RANKINGS_DDL,
    },
    Migration {
        id: 6,
        description: "raid rewards",
        sql: schema::RAID_REWARDS_DDL,
    },
];

#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let mut client = pool.get().await?;
    client
        .batch_execute(
            "CREATE SCHEMA IF NOT EXISTS raid;
             CREATE TABLE IF NOT EXISTS raid.schema_migrations (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
             );",
        )
        .await?;

    for migration in MIGRATIONS {
        let already_applied: bool = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM raid.schema_migrations WHERE id = $1)",
                &[&migration.id],
            )
            .await?
            .get(0);

        if already_applied {
            continue;
        }

        let tx = client.transaction().await?;
        tx.batch_execute(migration.sql).await?;
        tx.execute(
            "INSERT INTO raid.schema_migrations (id, description) VALUES ($1, $2)",
            &[&migration.id, &migration.description],
        )
        .await?;
        tx.commit().await?;

        info!(
            id = migration.id,
            description = migration.description,
            "applied migration"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_ids_are_unique_and_ordered() {
        let mut previous = 0;
        for migration in MIGRATIONS {
            assert!(migration.id > previous, "ids must strictly increase");
            previous = migration.id;
        }
    }

    #[test]
    fn boss_raids_apply_before_dependent_tables() {
        let raids = MIGRATIONS
            .iter()
            .position(|m| m.sql.contains("raid.boss_raids ("))
            .unwrap();
        for table in ["raid_participants", "raid_damages", "raid_rankings", "raid_rewards"] {
            let dependent = MIGRATIONS
                .iter()
                .position(|m| m.sql.contains(&format!("raid.{table} (")))
                .unwrap();
            assert!(raids < dependent, "{table} references boss_raids");
        }
    }
}
