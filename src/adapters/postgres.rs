use crate::config::toml_config::DatabaseConfig;
use crate::domain::model::{CategoryCount, QualityCheckSpec};
use crate::domain::ports::NewsStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

const CATEGORY_COUNTS_SQL: &str = r#"
    SELECT category, DATE(scraped_at) AS day, COUNT(*) AS cnt
    FROM trade_news
    WHERE scraped_at >= $1 AND scraped_at < $2
    GROUP BY category, DATE(scraped_at)
    ORDER BY day, category
"#;

/// `trade_news` over a Postgres pool. Only ever reads.
#[derive(Debug, Clone)]
pub struct PgNewsStore {
    pool: PgPool,
}

impl PgNewsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&config.url)
            .await?;

        tracing::info!(
            "Connected to database (max_connections={})",
            config.max_connections
        );
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl NewsStore for PgNewsStore {
    async fn count(&self, check: &QualityCheckSpec) -> Result<i64> {
        tracing::debug!("Running check '{}': {}", check.name, check.query);
        let count = sqlx::query_scalar::<_, i64>(&check.query)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn category_counts(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CategoryCount>> {
        let rows = sqlx::query_as::<_, (Option<String>, NaiveDate, i64)>(CATEGORY_COUNTS_SQL)
            .bind(since)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(category, date, count)| CategoryCount {
                category: category.unwrap_or_else(|| "Uncategorized".to_string()),
                date,
                count,
            })
            .collect())
    }
}
