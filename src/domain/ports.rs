use crate::domain::model::{CategoryCount, QualityCheckSpec};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read-only access to the scraped news table.
#[async_trait]
pub trait NewsStore: Send + Sync {
    /// 執行檢查的計數查詢
    async fn count(&self, check: &QualityCheckSpec) -> Result<i64>;

    async fn category_counts(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CategoryCount>>;
}

#[async_trait]
impl<T: NewsStore + ?Sized> NewsStore for std::sync::Arc<T> {
    async fn count(&self, check: &QualityCheckSpec) -> Result<i64> {
        (**self).count(check).await
    }

    async fn category_counts(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CategoryCount>> {
        (**self).category_counts(since, until).await
    }
}
