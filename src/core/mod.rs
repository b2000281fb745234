pub mod endpoint;
pub mod health;
pub mod interpreter;
pub mod mutation;
pub mod quality;
pub mod report;
pub mod retry;
pub mod scheduler;
pub mod trigger;
pub mod workflow;

pub use crate::domain::model::{
    CategoryCount, DailyReport, QualityCheckResult, QualityCheckSpec, QualityReport, RunSummary,
    ScrapeRequest, ScrapeResponse, ScrapeSummary,
};
pub use crate::domain::ports::NewsStore;
pub use crate::utils::error::Result;
