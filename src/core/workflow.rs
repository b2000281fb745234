use crate::config::WorkflowConfig;
use crate::core::health::HealthGate;
use crate::core::interpreter::interpret;
use crate::core::mutation::{build_request, ScrapeOperation};
use crate::core::quality::QualityValidator;
use crate::core::report::SummaryReporter;
use crate::core::retry::{run_with_retry, RetryPolicy};
use crate::core::trigger::HttpTrigger;
use crate::domain::model::{DailyReport, RunSummary};
use crate::domain::ports::NewsStore;
use crate::utils::error::{Result, WorkflowError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

pub type SharedStore = Arc<dyn NewsStore>;

/// Health gate → trigger → interpret → validate → report, one step at a time.
///
/// The retry policy applies per step: a failed step is retried on its own
/// and never re-runs the steps before it.
pub struct ScrapeWorkflow {
    endpoint: String,
    operation: ScrapeOperation,
    trigger: HttpTrigger,
    health: Option<HealthGate>,
    validator: Option<QualityValidator<SharedStore>>,
    retry: RetryPolicy,
}

impl ScrapeWorkflow {
    pub fn from_config(config: &WorkflowConfig, store: Option<SharedStore>) -> Result<Self> {
        let endpoint = config.scrape_endpoint()?;

        let health = if config.health.enabled {
            Some(HealthGate::new(
                config.health_url()?,
                config.health_interval(),
                config.health_timeout(),
            )?)
        } else {
            None
        };

        let validator = match (config.quality.enabled, store) {
            (true, Some(store)) => Some(QualityValidator::new(store, config.quality_checks())),
            (true, None) => {
                return Err(WorkflowError::config(
                    "quality checks are enabled but no database store was provided",
                ))
            }
            (false, _) => None,
        };

        Ok(Self {
            endpoint,
            operation: config.backend.operation,
            trigger: HttpTrigger::new(config.request_timeout())?,
            health,
            validator,
            retry: RetryPolicy::single_attempt(),
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn without_health_gate(mut self) -> Self {
        self.health = None;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_health_gate(&self) -> bool {
        self.health.is_some()
    }

    pub fn has_quality_checks(&self) -> bool {
        self.validator.is_some()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("scrape_run", %run_id);
        self.execute(run_id).instrument(span).await
    }

    async fn execute(&self, run_id: Uuid) -> Result<RunSummary> {
        tracing::info!("🚀 Starting scrape workflow run");

        if let Some(gate) = &self.health {
            tracing::info!("Waiting for backend health at: {}", gate.url());
            run_with_retry(&self.retry, "wait_for_backend", |_| gate.wait_until_live()).await?;
        }

        let request = build_request(&self.endpoint, self.operation);
        let request = &request;
        let payload = run_with_retry(&self.retry, "scrape_rss_feeds", |_| {
            self.trigger.trigger(request, self.operation)
        })
        .await?;

        // 同一份回應重新解析結果不會改變，只跑一次
        let scrape = run_with_retry(&RetryPolicy::single_attempt(), "check_scraping_result", |_| {
            let payload = payload.clone();
            async move { interpret(payload) }
        })
        .await?;

        // 品質檢查重試只重跑 SQL，不會再觸發一次爬取
        let quality = match &self.validator {
            Some(validator) => {
                let scrape = &scrape;
                Some(
                    run_with_retry(&self.retry, "check_data_quality", |_| {
                        validator.validate(scrape)
                    })
                    .await?,
                )
            }
            None => None,
        };

        Ok(SummaryReporter::report_run(run_id, scrape, quality))
    }
}

/// The once-a-day category breakdown.
pub struct DailyReportWorkflow {
    store: SharedStore,
}

impl DailyReportWorkflow {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn run(&self, now: DateTime<Utc>) -> Result<DailyReport> {
        let span = tracing::info_span!("daily_report", date = %now.date_naive());
        SummaryReporter::daily_report(self.store.as_ref(), now)
            .instrument(span)
            .await
    }
}
