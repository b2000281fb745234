use crate::domain::model::{ScrapeResponse, ScrapeSummary};
use crate::utils::error::{Result, WorkflowError};
use serde_json::Value;

/// Turn the mutation payload into a [`ScrapeSummary`].
///
/// Absent or empty payloads are `ResultMissingError`, shape mismatches are
/// `ProtocolError`, and `success: false` is `ApplicationError`. Zero saved
/// items only warns.
pub fn interpret(payload: Option<Value>) -> Result<ScrapeSummary> {
    let payload = match payload {
        None | Some(Value::Null) => return Err(WorkflowError::ResultMissingError),
        Some(Value::Object(fields)) if fields.is_empty() => {
            return Err(WorkflowError::ResultMissingError)
        }
        Some(payload @ Value::Object(_)) => payload,
        Some(other) => {
            return Err(WorkflowError::protocol(format!(
                "scrape payload must be an object, got: {}",
                other
            )))
        }
    };

    let response: ScrapeResponse = serde_json::from_value(payload).map_err(|e| {
        WorkflowError::protocol(format!("scrape payload does not match schema: {}", e))
    })?;

    // errors 陣列不論成功與否都逐筆記錄
    for error in &response.errors {
        tracing::warn!("⚠️ Backend reported scrape error: {}", error);
    }

    if !response.success {
        return Err(WorkflowError::ApplicationError {
            message: response
                .message
                .unwrap_or_else(|| "Unknown error".to_string()),
        });
    }

    if response.saved_count == 0 {
        tracing::warn!(
            skipped = response.skipped_count,
            "⚠️ No new items were found in this scraping run"
        );
    } else {
        tracing::info!(
            saved = response.saved_count,
            skipped = response.skipped_count,
            errors = response.error_count,
            "✅ Successfully saved {} news items",
            response.saved_count
        );
    }

    Ok(response.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_payload_is_normalized() {
        let summary = interpret(Some(json!({
            "success": true,
            "message": "done",
            "savedCount": 12,
            "skippedCount": 3,
            "errorCount": 0,
            "errors": []
        })))
        .unwrap();

        assert_eq!(summary.saved_count, 12);
        assert_eq!(summary.skipped_count, 3);
        assert_eq!(summary.error_count, 0);
        assert_eq!(summary.message.as_deref(), Some("done"));
    }

    #[test]
    fn test_saved_count_is_carried_verbatim() {
        for saved in [1_u64, 7, 250, 10_000] {
            let summary =
                interpret(Some(json!({"success": true, "savedCount": saved}))).unwrap();
            assert_eq!(summary.saved_count, saved);
        }
    }

    #[test]
    fn test_missing_payload() {
        assert!(matches!(interpret(None), Err(WorkflowError::ResultMissingError)));
        assert!(matches!(
            interpret(Some(Value::Null)),
            Err(WorkflowError::ResultMissingError)
        ));
        assert!(matches!(
            interpret(Some(json!({}))),
            Err(WorkflowError::ResultMissingError)
        ));
    }

    #[test]
    fn test_success_false_carries_message() {
        let err = interpret(Some(json!({
            "success": false,
            "message": "Feed https://example.com/rss returned 503"
        })))
        .unwrap_err();

        match err {
            WorkflowError::ApplicationError { message } => {
                assert_eq!(message, "Feed https://example.com/rss returned 503")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_absent_success_defaults_to_failure() {
        let err = interpret(Some(json!({"savedCount": 4}))).unwrap_err();
        match err {
            WorkflowError::ApplicationError { message } => assert_eq!(message, "Unknown error"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_zero_saved_is_not_an_error() {
        let summary = interpret(Some(json!({
            "success": true,
            "savedCount": 0,
            "skippedCount": 40
        })))
        .unwrap();
        assert_eq!(summary.saved_count, 0);
        assert_eq!(summary.skipped_count, 40);
    }

    #[test]
    fn test_errors_do_not_override_success() {
        let summary = interpret(Some(json!({
            "success": true,
            "savedCount": 2,
            "errorCount": 1,
            "errors": ["duplicate external_id abc"]
        })))
        .unwrap();
        assert_eq!(summary.errors, vec!["duplicate external_id abc".to_string()]);
    }

    #[test]
    fn test_shape_mismatch_is_protocol_error() {
        assert!(matches!(
            interpret(Some(json!({"success": true, "savedCount": "twelve"}))),
            Err(WorkflowError::ProtocolError { .. })
        ));
        assert!(matches!(
            interpret(Some(json!([1, 2, 3]))),
            Err(WorkflowError::ProtocolError { .. })
        ));
    }
}
