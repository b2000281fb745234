pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, Command};

pub use adapters::PgNewsStore;
pub use config::WorkflowConfig;
pub use crate::core::{
    scheduler::{GuardedScrape, WorkflowScheduler},
    workflow::{DailyReportWorkflow, ScrapeWorkflow, SharedStore},
};
pub use utils::error::{Result, WorkflowError};
