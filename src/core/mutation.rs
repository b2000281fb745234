use crate::domain::model::ScrapeRequest;
use serde::{Deserialize, Serialize};

const SCRAPE_RSS: &str = r#"
mutation {
    scrapeRss {
        success
        message
        savedCount
        skippedCount
        errorCount
        errors
    }
}
"#;

const SCRAPE_AND_SAVE_RSS_FEEDS: &str = r#"
mutation {
    scrapeAndSaveRssFeeds {
        success
        message
        savedCount
        skippedCount
        errorCount
        errors
    }
}
"#;

/// 後端 mutation 的版本化名稱
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScrapeOperation {
    #[default]
    ScrapeRss,
    ScrapeAndSaveRssFeeds,
}

impl ScrapeOperation {
    /// Field name under `data` in the GraphQL response.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::ScrapeRss => "scrapeRss",
            Self::ScrapeAndSaveRssFeeds => "scrapeAndSaveRssFeeds",
        }
    }

    pub fn document(self) -> &'static str {
        match self {
            Self::ScrapeRss => SCRAPE_RSS,
            Self::ScrapeAndSaveRssFeeds => SCRAPE_AND_SAVE_RSS_FEEDS,
        }
    }
}

pub fn build_request(endpoint: &str, operation: ScrapeOperation) -> ScrapeRequest {
    ScrapeRequest {
        endpoint: endpoint.to_string(),
        query: operation.document(),
        variables: serde_json::Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_request_canonical_fields() {
        for op in [ScrapeOperation::ScrapeRss, ScrapeOperation::ScrapeAndSaveRssFeeds] {
            let doc = op.document();
            assert!(doc.trim_start().starts_with("mutation"));
            assert!(doc.contains(op.field_name()));
            for field in ["success", "message", "savedCount", "skippedCount", "errorCount", "errors"] {
                assert!(doc.contains(field), "{} missing {}", op.field_name(), field);
            }
        }
    }

    #[test]
    fn test_build_request_has_empty_variables() {
        let request = build_request("http://backend/graphql", ScrapeOperation::ScrapeRss);
        assert_eq!(request.endpoint, "http://backend/graphql");
        assert!(request.variables.is_empty());
        assert_eq!(request.query, SCRAPE_RSS);
    }

    #[test]
    fn test_operation_names_deserialize_from_config() {
        let op: ScrapeOperation = serde_json::from_str("\"scrapeAndSaveRssFeeds\"").unwrap();
        assert_eq!(op, ScrapeOperation::ScrapeAndSaveRssFeeds);
    }
}
