use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Transport error: {message}")]
    TransportError { message: String },

    #[error("GraphQL protocol error: {message}")]
    ProtocolError { message: String },

    #[error("No scrape result found in response")]
    ResultMissingError,

    #[error("Scraping failed: {message}")]
    ApplicationError { message: String },

    #[error("Backend health check timed out after {waited:?} ({attempts} attempts)")]
    HealthCheckTimeoutError { waited: Duration, attempts: u32 },

    #[error("Data quality checks failed: {}", failures.join("; "))]
    DataQualityError { failures: Vec<String> },

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Scheduler error: {0}")]
    SchedulerError(#[from] tokio_cron_scheduler::JobSchedulerError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Backend,
    DataQuality,
    Infrastructure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl WorkflowError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportError {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::ProtocolError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::TransportError { .. } | Self::HealthCheckTimeoutError { .. } => {
                ErrorCategory::Network
            }
            Self::ProtocolError { .. }
            | Self::ResultMissingError
            | Self::ApplicationError { .. }
            | Self::SerializationError(_) => ErrorCategory::Backend,
            Self::DataQualityError { .. } => ErrorCategory::DataQuality,
            Self::DatabaseError(_) | Self::SchedulerError(_) | Self::IoError(_) => {
                ErrorCategory::Infrastructure
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Backend | ErrorCategory::DataQuality => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Infrastructure => {
                ErrorSeverity::Critical
            }
        }
    }

    /// 設定錯誤重試也不會成功，其餘交給排程器重試
    pub fn is_retryable(&self) -> bool {
        self.category() != ErrorCategory::Configuration
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ConfigurationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Set BACKEND_API_ENDPOINT to a full URL, or BACKEND_API_URL plus a path"
            }
            Self::TransportError { .. } => {
                "Check that the backend is reachable and responding within the request timeout"
            }
            Self::HealthCheckTimeoutError { .. } => {
                "The backend never reported healthy; check its deployment and /health route"
            }
            Self::ProtocolError { .. } | Self::SerializationError(_) => {
                "The backend response did not match the expected GraphQL contract"
            }
            Self::ResultMissingError => "Verify the configured mutation operation name",
            Self::ApplicationError { .. } => "Inspect the backend logs for the failed scrape",
            Self::DataQualityError { .. } => {
                "Recently scraped rows look wrong; check the scraper's category mapping"
            }
            Self::DatabaseError(_) => "Check DATABASE_URL and that the database is reachable",
            Self::SchedulerError(_) => "Check the cron expressions in the [schedule] section",
            Self::IoError(_) => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HealthCheckTimeoutError { waited, .. } => {
                format!("Backend did not become healthy within {}s", waited.as_secs())
            }
            Self::DataQualityError { failures } => {
                format!("{} data quality check(s) failed", failures.len())
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_quality_error_joins_failures() {
        let err = WorkflowError::DataQualityError {
            failures: vec!["a: bad".to_string(), "b: worse".to_string()],
        };
        assert_eq!(err.to_string(), "Data quality checks failed: a: bad; b: worse");
        assert_eq!(err.user_friendly_message(), "2 data quality check(s) failed");
    }

    #[test]
    fn test_configuration_errors_are_not_retryable() {
        assert!(!WorkflowError::config("no endpoint").is_retryable());
        assert!(WorkflowError::transport("timeout").is_retryable());
        assert!(WorkflowError::ResultMissingError.is_retryable());
        assert_eq!(
            WorkflowError::config("x").severity(),
            ErrorSeverity::Critical
        );
    }
}
