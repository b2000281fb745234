use crate::domain::model::{DailyReport, QualityReport, RunSummary, ScrapeSummary};
use crate::domain::ports::NewsStore;
use crate::utils::error::Result;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

pub const DAILY_WINDOW_HOURS: i64 = 24;

pub struct SummaryReporter;

impl SummaryReporter {
    /// 記錄單次執行結果，不會失敗
    pub fn report_run(
        run_id: Uuid,
        scrape: ScrapeSummary,
        quality: Option<QualityReport>,
    ) -> RunSummary {
        let summary = RunSummary {
            run_id,
            scrape,
            quality,
            finished_at: Utc::now(),
        };

        let quality_checks = summary
            .quality
            .as_ref()
            .map(|q| q.checks_performed)
            .unwrap_or(0);

        tracing::info!(
            run_id = %summary.run_id,
            total = summary.total(),
            skipped = summary.scrape.skipped_count,
            errors = summary.scrape.error_count,
            quality_checks,
            "📊 Scrape run summary"
        );

        if let Ok(json) = serde_json::to_string(&summary) {
            tracing::debug!("Run summary: {}", json);
        }

        summary
    }

    /// Per-category counts over the 24 hours ending at `now`.
    pub async fn daily_report<S: NewsStore + ?Sized>(
        store: &S,
        now: DateTime<Utc>,
    ) -> Result<DailyReport> {
        let since = now - Duration::hours(DAILY_WINDOW_HOURS);
        let rows = store.category_counts(since, now).await?;
        let report = DailyReport::from_rows(now.date_naive(), &rows);

        tracing::info!(
            date = %report.date,
            total = report.total,
            "📰 Daily summary: {} articles in {} categories",
            report.total,
            report.categories.len()
        );
        for (category, count) in &report.categories {
            tracing::info!("  {}: {}", category, count);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CategoryCount, QualityCheckSpec};
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};

    struct OneDay;

    #[async_trait]
    impl NewsStore for OneDay {
        async fn count(&self, _check: &QualityCheckSpec) -> Result<i64> {
            Ok(0)
        }

        async fn category_counts(
            &self,
            _since: DateTime<Utc>,
            _until: DateTime<Utc>,
        ) -> Result<Vec<CategoryCount>> {
            let date = NaiveDate::from_ymd_opt(2025, 7, 24).unwrap();
            Ok(vec![
                CategoryCount { category: "Trade".to_string(), date, count: 3 },
                CategoryCount { category: "Signing".to_string(), date, count: 2 },
                CategoryCount { category: "Trade".to_string(), date, count: 1 },
            ])
        }
    }

    fn scrape(saved: u64) -> ScrapeSummary {
        ScrapeSummary {
            message: Some("ok".to_string()),
            saved_count: saved,
            skipped_count: 3,
            error_count: 0,
            errors: vec![],
        }
    }

    #[test]
    fn test_report_run_total_is_saved_count() {
        let run_id = Uuid::new_v4();
        let summary = SummaryReporter::report_run(run_id, scrape(12), None);
        assert_eq!(summary.run_id, run_id);
        assert_eq!(summary.total(), 12);
        assert!(summary.quality.is_none());
    }

    #[test]
    fn test_daily_report_uses_store_rows() {
        let now = Utc.with_ymd_and_hms(2025, 7, 25, 9, 0, 0).unwrap();
        let report = tokio_test::block_on(SummaryReporter::daily_report(&OneDay, now));
        let report = tokio_test::assert_ok!(report);

        assert_eq!(report.date, NaiveDate::from_ymd_opt(2025, 7, 25).unwrap());
        assert_eq!(report.categories["Trade"], 4);
        assert_eq!(report.categories["Signing"], 2);
        assert_eq!(report.total, 6);
    }
}
