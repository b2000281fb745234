#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use scrape_workflow::utils::logger::{self, LogFormat};
#[cfg(feature = "lambda")]
use scrape_workflow::utils::validation::Validate;
#[cfg(feature = "lambda")]
use scrape_workflow::{PgNewsStore, ScrapeWorkflow, SharedStore, WorkflowConfig};
#[cfg(feature = "lambda")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "lambda")]
use std::sync::Arc;

/// EventBridge 排程事件，內容可為空
#[cfg(feature = "lambda")]
#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Request {
    pub skip_health: bool,
}

#[cfg(feature = "lambda")]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub message: String,
    pub run_id: String,
    pub saved_count: u64,
    pub skipped_count: u64,
    pub quality_checks: usize,
}

#[cfg(feature = "lambda")]
async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    tracing::info!("Starting scrape workflow Lambda function");

    let config = WorkflowConfig::from_env()?;
    config.validate()?;

    let store = match &config.database {
        Some(database) => Some(Arc::new(PgNewsStore::connect(database).await?) as SharedStore),
        None => None,
    };

    let mut workflow = ScrapeWorkflow::from_config(&config, store)?;
    if event.payload.skip_health {
        workflow = workflow.without_health_gate();
    }

    // 重試交給 Lambda 的非同步呼叫重試設定
    let summary = workflow.run().await?;

    let response = Response {
        message: "Scrape workflow completed successfully".to_string(),
        run_id: summary.run_id.to_string(),
        saved_count: summary.scrape.saved_count,
        skipped_count: summary.scrape.skipped_count,
        quality_checks: summary
            .quality
            .as_ref()
            .map(|q| q.checks_performed)
            .unwrap_or(0),
    };

    tracing::info!("Scrape workflow Lambda function completed successfully");
    Ok(response)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_logger(false, LogFormat::Json);

    run(service_fn(function_handler)).await
}
