use clap::Parser;
use scrape_workflow::utils::error::ErrorSeverity;
use scrape_workflow::utils::logger::{self, LogFormat};
use scrape_workflow::utils::validation::Validate;
use scrape_workflow::{
    Cli, Command, DailyReportWorkflow, PgNewsStore, ScrapeWorkflow, SharedStore, WorkflowConfig,
    WorkflowError, WorkflowScheduler,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日誌
    logger::init_logger(cli.verbose, LogFormat::from_env_or(LogFormat::Compact));

    tracing::info!("Starting scrape-workflow CLI");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    if let Err(e) = execute(cli).await {
        tracing::error!(
            "❌ Workflow failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn execute(cli: Cli) -> Result<(), WorkflowError> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            WorkflowConfig::from_file(path)?
        }
        None => WorkflowConfig::from_env()?,
    };
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    match cli.command {
        Command::CheckConfig => {
            println!("workflow:      {}", config.workflow.name);
            println!("endpoint:      {}", config.scrape_endpoint()?);
            println!("operation:     {}", config.backend.operation.field_name());
            if config.health.enabled {
                println!("health:        {}", config.health_url()?);
            }
            println!("quality:       {}", config.quality.enabled);
            println!("scrape cron:   {}", config.schedule.scrape_cron);
            println!("daily cron:    {}", config.schedule.daily_cron);
        }
        Command::Run { retry, skip_health } => {
            let store = connect_store(&config).await?;
            let mut workflow = ScrapeWorkflow::from_config(&config, store)?;
            if skip_health {
                workflow = workflow.without_health_gate();
            }

            let summary = if retry {
                scrape_workflow::GuardedScrape::new(workflow, config.retry_policy())
                    .run()
                    .await?
            } else {
                workflow.run().await?
            };

            println!("✅ Scrape completed: {} saved", summary.total());
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Daily => {
            let store = connect_store(&config).await?.ok_or_else(|| {
                WorkflowError::config("the daily report needs a [database] section or DATABASE_URL")
            })?;
            let report = DailyReportWorkflow::new(store).run(chrono::Utc::now()).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Schedule => {
            let store = connect_store(&config).await?;
            let workflow = ScrapeWorkflow::from_config(&config, store.clone())?;
            let daily = store.map(DailyReportWorkflow::new);

            let harness = WorkflowScheduler::new(&config, workflow, daily);
            let mut scheduler = harness.start().await?;

            tracing::info!("⏰ Scheduler running, press Ctrl+C to stop");
            tokio::signal::ctrl_c().await?;

            tracing::info!("Shutting down scheduler");
            scheduler.shutdown().await?;
        }
    }

    Ok(())
}

async fn connect_store(config: &WorkflowConfig) -> Result<Option<SharedStore>, WorkflowError> {
    match &config.database {
        Some(database) => {
            let store = PgNewsStore::connect(database).await?;
            Ok(Some(Arc::new(store) as SharedStore))
        }
        None => Ok(None),
    }
}
