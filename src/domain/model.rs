use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// 每次執行只建立一次的 GraphQL 請求
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeRequest {
    #[serde(skip)]
    pub endpoint: String,
    pub query: &'static str,
    pub variables: serde_json::Map<String, serde_json::Value>,
}

/// Canonical payload of the scrape mutation.
///
/// Unknown fields are ignored so the backend can add fields, but every
/// known field must have the right JSON type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub saved_count: u64,
    #[serde(default)]
    pub skipped_count: u64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub errors: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Interpreted scrape result handed to the later steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeSummary {
    pub message: Option<String>,
    pub saved_count: u64,
    pub skipped_count: u64,
    pub error_count: u64,
    pub errors: Vec<String>,
}

impl From<ScrapeResponse> for ScrapeSummary {
    fn from(response: ScrapeResponse) -> Self {
        Self {
            message: response.message,
            saved_count: response.saved_count,
            skipped_count: response.skipped_count,
            error_count: response.error_count,
            errors: response.errors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityCheckSpec {
    pub name: String,
    pub query: String,
    pub expected_min: Option<i64>,
    pub expected_max: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityCheckResult {
    pub name: String,
    pub observed_count: i64,
    pub passed: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    pub checks_performed: usize,
    pub results: Vec<QualityCheckResult>,
}

/// One GROUP BY row of the daily report query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub categories: BTreeMap<String, i64>,
    pub total: i64,
}

impl DailyReport {
    /// 依類別加總，同一類別跨日期的列會合併
    pub fn from_rows(date: NaiveDate, rows: &[CategoryCount]) -> Self {
        let mut categories = BTreeMap::new();
        for row in rows {
            *categories.entry(row.category.clone()).or_insert(0) += row.count;
        }
        let total = categories.values().sum();

        Self {
            date,
            categories,
            total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub scrape: ScrapeSummary,
    pub quality: Option<QualityReport>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn total(&self) -> u64 {
        self.scrape.saved_count
    }
}
