//! Connectivity check for the hosted catalog database.

use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use std::time::{Duration, Instant};
use tracing::instrument;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub latency_ms: u128,
    pub products: Option<i64>,
    pub categories: Option<i64>,
    pub error: Option<String>,
}

impl HealthReport {
    fn failed(started: Instant, error: impl ToString) -> Self {
        Self { healthy: false, latency_ms: started.elapsed().as_millis(), products: None, categories: None, error: Some(error.to_string()) }
    }
}

/// Connects, runs `SELECT 1`, and counts catalog rows. Never returns an error; failures land in the report.
#[instrument(skip(database_url))]
pub async fn check_database(database_url: &str, timeout: Duration) -> HealthReport {
    let started = Instant::now();
    let pool = match PgPoolOptions::new().max_connections(1).acquire_timeout(timeout).connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => return HealthReport::failed(started, e),
    };
    if let Err(e) = sqlx::query("SELECT 1").execute(&pool).await {
        return HealthReport::failed(started, e);
    }
    let count = |table: &'static str| {
        let pool = pool.clone();
        async move {
            let sql = format!("SELECT COUNT(*) FROM {table}");
            sqlx::query_scalar::<_, i64>(&sql).fetch_one(&pool).await.ok()
        }
    };
    let products = count("products").await;
    let categories = count("categories").await;
    pool.close().await;
    HealthReport { healthy: true, latency_ms: started.elapsed().as_millis(), products, categories, error: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_database_is_unhealthy() {
        let report = check_database("postgres://nobody@127.0.0.1:1/none", Duration::from_millis(200)).await;
        assert!(!report.healthy);
        assert!(report.error.is_some());
    }
}
