use crate::utils::error::{Result, WorkflowError};
use reqwest::Client;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(300);
/// Upper bound for the probe sent at the deadline.
const FINAL_PROBE_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthOutcome {
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Polls the backend liveness endpoint until it answers 2xx.
#[derive(Debug, Clone)]
pub struct HealthGate {
    client: Client,
    url: String,
    interval: Duration,
    timeout: Duration,
}

impl HealthGate {
    pub fn new(url: impl Into<String>, interval: Duration, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| WorkflowError::config(format!("Failed to build health client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            interval,
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// 在等待期間以 sleep 讓出執行緒，不佔用 worker
    pub async fn wait_until_live(&self) -> Result<HealthOutcome> {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut attempts = 0;

        loop {
            attempts += 1;
            // 期限當下的最後一次輪詢仍給它一點時間回應
            let budget = deadline
                .saturating_duration_since(Instant::now())
                .max(self.interval.min(FINAL_PROBE_GRACE));

            match self.probe(budget).await {
                Ok(()) => {
                    let elapsed = started.elapsed();
                    tracing::info!(
                        attempts,
                        "💚 Backend is healthy after {:?}",
                        elapsed
                    );
                    return Ok(HealthOutcome { attempts, elapsed });
                }
                Err(reason) => {
                    tracing::debug!(attempt = attempts, "Health probe failed: {}", reason);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                let waited = started.elapsed();
                tracing::error!(
                    attempts,
                    "❌ Backend did not become healthy within {:?}",
                    self.timeout
                );
                return Err(WorkflowError::HealthCheckTimeoutError { waited, attempts });
            }

            // 最後一次輪詢落在期限上
            tokio::time::sleep_until((now + self.interval).min(deadline)).await;
        }
    }

    async fn probe(&self, budget: Duration) -> std::result::Result<(), String> {
        let response = self
            .client
            .get(&self.url)
            .timeout(budget)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("HTTP {}", response.status()))
        }
    }
}
