use crate::core::mutation::ScrapeOperation;
use crate::domain::model::ScrapeRequest;
use crate::utils::error::{Result, WorkflowError};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Value>,
}

/// Sends the scrape mutation. One POST per call, never retried here.
#[derive(Debug, Clone)]
pub struct HttpTrigger {
    client: Client,
    timeout: Duration,
}

impl HttpTrigger {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WorkflowError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 回傳 `data.<operation>`，欄位不存在時為 `None`
    pub async fn trigger(
        &self,
        request: &ScrapeRequest,
        operation: ScrapeOperation,
    ) -> Result<Option<Value>> {
        tracing::debug!("Posting {} mutation to: {}", operation.field_name(), request.endpoint);

        let response = self
            .client
            .post(&request.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        tracing::debug!("Backend response status: {}", status);

        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        // GraphQL 錯誤可能夾帶在 4xx/5xx 回應中，先檢查 errors 欄位
        let envelope = serde_json::from_str::<GraphQlEnvelope>(&body);
        if let Ok(GraphQlEnvelope {
            errors: Some(errors),
            ..
        }) = &envelope
        {
            if !errors.is_null() {
                return Err(WorkflowError::protocol(format!("GraphQL errors: {}", errors)));
            }
        }

        if !status.is_success() {
            return Err(WorkflowError::transport(format!(
                "backend returned HTTP {}",
                status
            )));
        }

        let envelope = envelope.map_err(|e| {
            WorkflowError::protocol(format!("response body is not a GraphQL envelope: {}", e))
        })?;

        Ok(envelope
            .data
            .and_then(|mut data| data.get_mut(operation.field_name()).map(Value::take))
            .filter(|payload| !payload.is_null()))
    }

    fn transport_error(&self, error: reqwest::Error) -> WorkflowError {
        if error.is_timeout() {
            WorkflowError::transport(format!(
                "request timed out after {}s",
                self.timeout.as_secs()
            ))
        } else {
            WorkflowError::transport(error.to_string())
        }
    }
}
