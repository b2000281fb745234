use crate::config::WorkflowConfig;
use crate::core::retry::{run_with_retry, RetryPolicy};
use crate::core::workflow::{DailyReportWorkflow, ScrapeWorkflow};
use crate::domain::model::{DailyReport, RunSummary};
use crate::utils::error::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

/// A scrape workflow that never overlaps with itself.
///
/// `run` waits for an active run to finish; `try_run` skips instead, so
/// cron ticks that land on a busy run are dropped rather than queued.
#[derive(Clone)]
pub struct GuardedScrape {
    workflow: Arc<ScrapeWorkflow>,
    lock: Arc<Mutex<()>>,
}

impl GuardedScrape {
    pub fn new(workflow: ScrapeWorkflow, policy: RetryPolicy) -> Self {
        Self {
            workflow: Arc::new(workflow.with_retry_policy(policy)),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock.try_lock().is_err()
    }

    pub async fn run(&self) -> Result<RunSummary> {
        if self.is_running() {
            tracing::info!("⏳ Previous scrape run still active, waiting for it to finish");
        }
        let _guard = self.lock.lock().await;

        self.workflow.run().await
    }

    /// 上一次執行尚未結束時直接跳過，回傳 `None`
    pub async fn try_run(&self) -> Option<Result<RunSummary>> {
        let Ok(_guard) = self.lock.try_lock() else {
            tracing::info!("⏭️ Previous scrape run still active, skipping this tick");
            return None;
        };

        Some(self.workflow.run().await)
    }
}

/// The daily summary is a single query, so its retries wrap the whole run.
#[derive(Clone)]
pub struct GuardedDaily {
    workflow: Arc<DailyReportWorkflow>,
    policy: RetryPolicy,
    lock: Arc<Mutex<()>>,
}

impl GuardedDaily {
    pub fn new(workflow: DailyReportWorkflow, policy: RetryPolicy) -> Self {
        Self {
            workflow: Arc::new(workflow),
            policy,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn try_run(&self) -> Option<Result<DailyReport>> {
        let Ok(_guard) = self.lock.try_lock() else {
            tracing::info!("⏭️ Previous daily summary still active, skipping this tick");
            return None;
        };

        Some(run_with_retry(&self.policy, "daily_summary", |_| self.workflow.run(Utc::now())).await)
    }
}

/// Cron harness: scrape every 5 minutes, optional daily summary.
pub struct WorkflowScheduler {
    scrape_cron: String,
    daily_cron: String,
    scrape: GuardedScrape,
    daily: Option<GuardedDaily>,
}

impl WorkflowScheduler {
    pub fn new(
        config: &WorkflowConfig,
        scrape: ScrapeWorkflow,
        daily: Option<DailyReportWorkflow>,
    ) -> Self {
        let policy = config.retry_policy();
        Self {
            scrape_cron: config.schedule.scrape_cron.clone(),
            daily_cron: config.schedule.daily_cron.clone(),
            scrape: GuardedScrape::new(scrape, policy),
            daily: daily.map(|d| GuardedDaily::new(d, policy)),
        }
    }

    pub fn scrape(&self) -> &GuardedScrape {
        &self.scrape
    }

    /// 建立並啟動排程器，錯過的觸發不會補跑
    pub async fn start(&self) -> Result<JobScheduler> {
        let scheduler = JobScheduler::new().await?;

        let scrape = self.scrape.clone();
        let job = Job::new_async(self.scrape_cron.as_str(), move |_uuid, _lock| {
            let scrape = scrape.clone();
            Box::pin(async move {
                // 錯誤已在 run_with_retry 內告警
                if let Some(Ok(summary)) = scrape.try_run().await {
                    tracing::info!(
                        run_id = %summary.run_id,
                        "Scheduled scrape completed ({} saved)",
                        summary.total()
                    );
                }
            })
        })?;
        scheduler.add(job).await?;
        tracing::info!("Scheduled scrape workflow: {}", self.scrape_cron);

        if let Some(daily) = &self.daily {
            let daily = daily.clone();
            let job = Job::new_async(self.daily_cron.as_str(), move |_uuid, _lock| {
                let daily = daily.clone();
                Box::pin(async move {
                    if let Some(Ok(report)) = daily.try_run().await {
                        tracing::info!(
                            date = %report.date,
                            "Daily summary completed ({} articles)",
                            report.total
                        );
                    }
                })
            })?;
            scheduler.add(job).await?;
            tracing::info!("Scheduled daily summary: {}", self.daily_cron);
        }

        scheduler.start().await?;
        Ok(scheduler)
    }
}
