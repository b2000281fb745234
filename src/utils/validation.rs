use crate::utils::error::{Result, WorkflowError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(WorkflowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(WorkflowError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(WorkflowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// 資料庫連線字串只接受 postgres scheme
pub fn validate_database_url(field_name: &str, url_str: &str) -> Result<()> {
    match Url::parse(url_str) {
        Ok(url) if matches!(url.scheme(), "postgres" | "postgresql") => Ok(()),
        Ok(url) => Err(WorkflowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url.scheme().to_string(),
            reason: "Database URL must use the postgres:// scheme".to_string(),
        }),
        Err(e) => Err(WorkflowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: "<redacted>".to_string(),
            reason: format!("Invalid database URL: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(WorkflowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(WorkflowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(WorkflowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// tokio-cron-scheduler 使用含秒欄位的六段式 cron
pub fn validate_cron(field_name: &str, expr: &str) -> Result<()> {
    validate_non_empty_string(field_name, expr)?;

    let fields = expr.split_whitespace().count();
    if !(6..=7).contains(&fields) {
        return Err(WorkflowError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: expr.to_string(),
            reason: format!(
                "Expected 6 cron fields (sec min hour day month weekday), found {}",
                fields
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("backend.endpoint", "https://example.com").is_ok());
        assert!(validate_url("backend.endpoint", "http://example.com").is_ok());
        assert!(validate_url("backend.endpoint", "").is_err());
        assert!(validate_url("backend.endpoint", "invalid-url").is_err());
        assert!(validate_url("backend.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_database_url() {
        assert!(validate_database_url("database.url", "postgres://u:p@localhost/news").is_ok());
        assert!(validate_database_url("database.url", "mysql://localhost/news").is_err());
        assert!(validate_database_url("database.url", "not a url").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("schedule.retries", 3, 1, 3).is_ok());
        assert!(validate_range("schedule.retries", 0, 1, 3).is_err());
        assert!(validate_range("schedule.retries", 4, 1, 3).is_err());
    }

    #[test]
    fn test_validate_cron() {
        assert!(validate_cron("schedule.scrape_cron", "0 */5 * * * *").is_ok());
        assert!(validate_cron("schedule.scrape_cron", "*/5 * * * *").is_err());
        assert!(validate_cron("schedule.scrape_cron", "  ").is_err());
    }
}
