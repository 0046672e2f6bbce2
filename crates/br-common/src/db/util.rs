#![allow(async_fn_in_trait)]

use deadpool_postgres::GenericClient;
use std::{sync::OnceLock, time::Instant};
use tokio_postgres::ToStatement;
use tracing::warn;

fn slow_query_threshold_ms() -> Option<u64> {
    static CACHE: OnceLock<Option<u64>> = OnceLock::new();

    *CACHE.get_or_init(|| {
        std::env::var("BR_DB_LOG_MIN_DURATION_MS")
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .map(|v| v.max(0) as u64)
            .filter(|v| *v > 0)
    })
}

fn maybe_log_slow_query(label: &str, started_at: Instant) {
    if let Some(threshold_ms) = slow_query_threshold_ms() {
        let elapsed_ms = started_at.elapsed().as_millis() as u64;
        if elapsed_ms >= threshold_ms {
            warn!(query = label, elapsed_ms, "slow_query_detected");
        }
    }
}

/// Query/execute wrappers that log statements slower than
/// `BR_DB_LOG_MIN_DURATION_MS`. Implemented over [`GenericClient`] so the
/// same helpers work on a pooled client and inside a transaction.
pub trait TimedClientExt: GenericClient {
    async fn timed_query<S>(
        &self,
        statement: &S,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
        label: &str,
    ) -> Result<Vec<tokio_postgres::Row>, tokio_postgres::Error>
    where
        S: ToStatement + Sync + Send + ?Sized,
    {
        let started = Instant::now();
        let result = self.query(statement, params).await;
        maybe_log_slow_query(label, started);
        result
    }

    async fn timed_query_opt<S>(
        &self,
        statement: &S,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
        label: &str,
    ) -> Result<Option<tokio_postgres::Row>, tokio_postgres::Error>
    where
        S: ToStatement + Sync + Send + ?Sized,
    {
        let started = Instant::now();
        let result = self.query_opt(statement, params).await;
        maybe_log_slow_query(label, started);
        result
    }

    async fn timed_execute<S>(
        &self,
        statement: &S,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
        label: &str,
    ) -> Result<u64, tokio_postgres::Error>
    where
        S: ToStatement + Sync + Send + ?Sized,
    {
        let started = Instant::now();
        let result = self.execute(statement, params).await;
        maybe_log_slow_query(label, started);
        result
    }

    async fn timed_execute_cached(
        &self,
        statement: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
        label: &str,
    ) -> Result<u64, tokio_postgres::Error> {
        let started = Instant::now();
        let prepared = self.prepare_cached(statement).await?;
        let result = self.execute(&prepared, params).await;
        maybe_log_slow_query(label, started);
        result
    }
}

impl<T: GenericClient + ?Sized> TimedClientExt for T {}
