use crate::domain::model::{QualityCheckResult, QualityCheckSpec, QualityReport, ScrapeSummary};
use crate::domain::ports::NewsStore;
use crate::utils::error::{Result, WorkflowError};

pub const DEFAULT_WINDOW_MINUTES: i64 = 10;
pub const DEFAULT_CATEGORIES: [&str; 3] = ["Trade", "Signing", "Other"];

impl QualityCheckSpec {
    /// The three fixed checks run after every scrape.
    pub fn defaults(window_minutes: i64, allowed_categories: &[String]) -> Vec<Self> {
        let recent = format!(
            "scraped_at > NOW() - INTERVAL '{} minutes'",
            window_minutes
        );
        let allowed = allowed_categories
            .iter()
            .map(|c| format!("'{}'", c.replace('\'', "''")))
            .collect::<Vec<_>>()
            .join(", ");

        vec![
            Self {
                name: "recent_rows".to_string(),
                query: format!("SELECT COUNT(*) FROM trade_news WHERE {}", recent),
                expected_min: Some(1),
                expected_max: None,
            },
            Self {
                name: "null_category".to_string(),
                query: format!(
                    "SELECT COUNT(*) FROM trade_news WHERE {} AND category IS NULL",
                    recent
                ),
                expected_min: None,
                expected_max: Some(0),
            },
            Self {
                name: "invalid_category".to_string(),
                query: format!(
                    "SELECT COUNT(*) FROM trade_news WHERE {} AND category NOT IN ({})",
                    recent, allowed
                ),
                expected_min: None,
                expected_max: Some(0),
            },
        ]
    }
}

pub fn evaluate(check: &QualityCheckSpec, observed: i64) -> QualityCheckResult {
    let message = match (check.expected_min, check.expected_max) {
        (Some(min), _) if observed < min => Some(format!(
            "{}: Expected at least {}, got {}",
            check.name, min, observed
        )),
        (_, Some(max)) if observed > max => Some(format!(
            "{}: Expected at most {}, got {}",
            check.name, max, observed
        )),
        _ => None,
    };

    QualityCheckResult {
        name: check.name.clone(),
        observed_count: observed,
        passed: message.is_none(),
        message,
    }
}

pub struct QualityValidator<S: NewsStore> {
    store: S,
    checks: Vec<QualityCheckSpec>,
}

impl<S: NewsStore> QualityValidator<S> {
    pub fn new(store: S, checks: Vec<QualityCheckSpec>) -> Self {
        Self { store, checks }
    }

    pub fn checks(&self) -> &[QualityCheckSpec] {
        &self.checks
    }

    /// Runs every check, then fails once with all the failures joined.
    pub async fn validate(&self, scrape: &ScrapeSummary) -> Result<QualityReport> {
        tracing::debug!(
            saved = scrape.saved_count,
            "Running {} data quality checks",
            self.checks.len()
        );

        let mut results = Vec::with_capacity(self.checks.len());
        for check in &self.checks {
            let observed = self.store.count(check).await?;
            let result = evaluate(check, observed);
            if result.passed {
                tracing::debug!("✅ {} passed ({})", check.name, observed);
            } else {
                tracing::warn!("❌ {} failed ({})", check.name, observed);
            }
            results.push(result);
        }

        let failures: Vec<String> = results.iter().filter_map(|r| r.message.clone()).collect();
        if !failures.is_empty() {
            return Err(WorkflowError::DataQualityError { failures });
        }

        tracing::info!(
            saved = scrape.saved_count,
            "✅ All {} data quality checks passed",
            results.len()
        );

        Ok(QualityReport {
            checks_performed: results.len(),
            results,
        })
    }
}
