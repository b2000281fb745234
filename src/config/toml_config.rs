use crate::core::endpoint::{resolve_endpoint, sibling_url, BASE_URL_VAR, ENDPOINT_VAR};
use crate::core::mutation::ScrapeOperation;
use crate::core::quality::{DEFAULT_CATEGORIES, DEFAULT_WINDOW_MINUTES};
use crate::core::retry::RetryPolicy;
use crate::domain::model::QualityCheckSpec;
use crate::utils::error::{Result, WorkflowError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Everything one workflow run needs, resolved once before the run starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub workflow: WorkflowMeta,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub health: HealthConfig,
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowMeta {
    pub name: String,
    pub description: String,
}

impl Default for WorkflowMeta {
    fn default() -> Self {
        Self {
            name: "nba_rss_scraper".to_string(),
            description: "Scrape NBA trade news from RSS feeds".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Full URL, or a path under `base_url`.
    pub endpoint: Option<String>,
    pub base_url: Option<String>,
    pub operation: ScrapeOperation,
    pub timeout_seconds: u64,
    pub health_path: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            base_url: None,
            operation: ScrapeOperation::default(),
            timeout_seconds: 120,
            health_path: "/health".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    pub timeout_seconds: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 30,
            timeout_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub enabled: bool,
    pub window_minutes: i64,
    pub allowed_categories: Vec<String>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            window_minutes: DEFAULT_WINDOW_MINUTES,
            allowed_categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub scrape_cron: String,
    pub daily_cron: String,
    pub retries: u32,
    pub retry_delay_seconds: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            scrape_cron: "0 */5 * * * *".to_string(),
            daily_cron: "0 0 9 * * *".to_string(),
            retries: 3,
            retry_delay_seconds: 60,
        }
    }
}

impl WorkflowConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，未設定的端點改用環境變數
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: Self = toml::from_str(&processed_content)
            .map_err(|e| WorkflowError::config(format!("TOML parsing error: {}", e)))?;
        config.apply_env_fallback();
        Ok(config)
    }

    /// 替換環境變數 (例如 ${DATABASE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| WorkflowError::config(format!("invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    fn apply_env_fallback(&mut self) {
        if self.backend.endpoint.is_none() {
            self.backend.endpoint = std::env::var(ENDPOINT_VAR).ok();
        }
        if self.backend.base_url.is_none() {
            self.backend.base_url = std::env::var(BASE_URL_VAR).ok();
        }
    }

    /// Build a config from environment variables only.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_fallback();

        if let Ok(operation) = std::env::var("BACKEND_OPERATION") {
            config.backend.operation = serde_json::from_value(serde_json::Value::String(
                operation.clone(),
            ))
            .map_err(|_| WorkflowError::InvalidConfigValueError {
                field: "BACKEND_OPERATION".to_string(),
                value: operation,
                reason: "expected scrapeRss or scrapeAndSaveRssFeeds".to_string(),
            })?;
        }
        if let Some(enabled) = env_parse::<bool>("HEALTH_CHECK_ENABLED")? {
            config.health.enabled = enabled;
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database = Some(DatabaseConfig {
                url,
                max_connections: default_max_connections(),
            });
            config.quality.enabled = true;
        }
        if let Some(enabled) = env_parse::<bool>("QUALITY_CHECKS_ENABLED")? {
            config.quality.enabled = enabled;
        }
        if let Some(timeout) = env_parse::<u64>("REQUEST_TIMEOUT_SECONDS")? {
            config.backend.timeout_seconds = timeout;
        }

        Ok(config)
    }

    pub fn scrape_endpoint(&self) -> Result<String> {
        resolve_endpoint(
            self.backend.endpoint.as_deref(),
            self.backend.base_url.as_deref(),
        )
    }

    pub fn health_url(&self) -> Result<String> {
        sibling_url(&self.scrape_endpoint()?, &self.backend.health_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_seconds)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_secs(self.health.interval_seconds)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health.timeout_seconds)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.schedule.retries,
            Duration::from_secs(self.schedule.retry_delay_seconds),
        )
    }

    pub fn quality_checks(&self) -> Vec<QualityCheckSpec> {
        QualityCheckSpec::defaults(
            self.quality.window_minutes,
            &self.quality.allowed_categories,
        )
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        let endpoint = self.scrape_endpoint()?;
        validation::validate_url("backend.endpoint", &endpoint)?;
        validation::validate_range("backend.timeout_seconds", self.backend.timeout_seconds, 1, 600)?;

        if self.health.enabled {
            validation::validate_positive_number(
                "health.interval_seconds",
                self.health.interval_seconds,
                1,
            )?;
            validation::validate_range(
                "health.timeout_seconds",
                self.health.timeout_seconds,
                self.health.interval_seconds,
                3600,
            )?;
        }

        if let Some(database) = &self.database {
            validation::validate_database_url("database.url", &database.url)?;
            validation::validate_range("database.max_connections", database.max_connections, 1, 20)?;
        }

        if self.quality.enabled {
            if self.database.is_none() {
                return Err(WorkflowError::config(
                    "quality checks are enabled but no [database] is configured",
                ));
            }
            validation::validate_range("quality.window_minutes", self.quality.window_minutes, 1, 1440)?;
            if self.quality.allowed_categories.is_empty() {
                return Err(WorkflowError::InvalidConfigValueError {
                    field: "quality.allowed_categories".to_string(),
                    value: "[]".to_string(),
                    reason: "at least one category is required".to_string(),
                });
            }
            for category in &self.quality.allowed_categories {
                validation::validate_non_empty_string("quality.allowed_categories", category)?;
            }
        }

        validation::validate_cron("schedule.scrape_cron", &self.schedule.scrape_cron)?;
        validation::validate_cron("schedule.daily_cron", &self.schedule.daily_cron)?;
        validation::validate_range("schedule.retries", self.schedule.retries, 1, 3)?;

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| WorkflowError::InvalidConfigValueError {
                field: name.to_string(),
                value: raw,
                reason: "could not parse value".to_string(),
            }),
        Err(_) => Ok(None),
    }
}

impl Validate for WorkflowConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[workflow]
name = "nba_rss_scraper"
description = "Scrape NBA trade news"

[backend]
endpoint = "/graphql"
base_url = "http://backend:8000"
operation = "scrapeAndSaveRssFeeds"
timeout_seconds = 120

[health]
enabled = true
interval_seconds = 30
timeout_seconds = 300

[database]
url = "postgres://airflow:secret@db:5432/nba"

[quality]
enabled = true
window_minutes = 10

[schedule]
retries = 2
retry_delay_seconds = 60
"#;

        let config = WorkflowConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.scrape_endpoint().unwrap(), "http://backend:8000/graphql");
        assert_eq!(config.health_url().unwrap(), "http://backend:8000/health");
        assert_eq!(config.backend.operation, ScrapeOperation::ScrapeAndSaveRssFeeds);
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
        assert_eq!(config.retry_policy().max_attempts, 3);
        assert_eq!(config.quality.allowed_categories, vec!["Trade", "Signing", "Other"]);
        assert_eq!(config.database.as_ref().unwrap().max_connections, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = WorkflowConfig::from_toml_str(
            r#"
[backend]
endpoint = "https://api.example.com/graphql"
"#,
        )
        .unwrap();

        assert!(config.health.enabled);
        assert_eq!(config.health_interval(), Duration::from_secs(30));
        assert_eq!(config.health_timeout(), Duration::from_secs(300));
        assert!(!config.quality.enabled);
        assert_eq!(config.schedule.scrape_cron, "0 */5 * * * *");
        assert_eq!(config.schedule.daily_cron, "0 0 9 * * *");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SCRAPE_WORKFLOW_TEST_DB_PASSWORD", "hunter2");

        let config = WorkflowConfig::from_toml_str(
            r#"
[backend]
endpoint = "https://api.example.com/graphql"

[database]
url = "postgres://app:${SCRAPE_WORKFLOW_TEST_DB_PASSWORD}@db/nba"
"#,
        )
        .unwrap();
        assert_eq!(
            config.database.unwrap().url,
            "postgres://app:hunter2@db/nba"
        );

        std::env::remove_var("SCRAPE_WORKFLOW_TEST_DB_PASSWORD");
    }

    #[test]
    fn test_quality_without_database_is_invalid() {
        let config = WorkflowConfig::from_toml_str(
            r#"
[backend]
endpoint = "https://api.example.com/graphql"

[quality]
enabled = true
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(WorkflowError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let config = WorkflowConfig::from_toml_str(
            r#"
[backend]
endpoint = "https://api.example.com/graphql"
timeout_seconds = 0
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = WorkflowConfig::from_toml_str(
            r#"
[backend]
endpoint = "https://api.example.com/graphql"

[schedule]
scrape_cron = "*/5 * * * *"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_operation_is_parse_error() {
        let result = WorkflowConfig::from_toml_str(
            r#"
[backend]
operation = "scrapeEverything"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
[workflow]
name = "file-test"

[backend]
endpoint = "https://api.example.com/graphql"
"#,
            )
            .unwrap();

        let config = WorkflowConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.workflow.name, "file-test");
        assert_eq!(config.workflow.description, "Scrape NBA trade news from RSS feeds");
    }
}
