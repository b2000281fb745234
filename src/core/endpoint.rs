//! Backend endpoint resolution.

use crate::utils::error::{Result, WorkflowError};
use url::Url;

pub const ENDPOINT_VAR: &str = "BACKEND_API_ENDPOINT";
pub const BASE_URL_VAR: &str = "BACKEND_API_URL";

/// Resolve the GraphQL endpoint from a configured value and a base URL.
///
/// A configured value that is already an absolute http(s) URL wins as-is.
/// Otherwise it is treated as a path under `base_url`. With no configured
/// value the base URL itself is the endpoint.
pub fn resolve_endpoint(configured: Option<&str>, base_url: Option<&str>) -> Result<String> {
    let configured = configured.map(str::trim).filter(|v| !v.is_empty());
    let base_url = base_url.map(str::trim).filter(|v| !v.is_empty());

    if let Some(value) = configured {
        if is_http_url(value) {
            return Ok(value.to_string());
        }
    }

    let base = base_url.ok_or_else(|| {
        WorkflowError::config(match configured {
            Some(path) => format!(
                "'{}' is not a full URL and {} is not set",
                path, BASE_URL_VAR
            ),
            None => format!("neither {} nor {} is set", ENDPOINT_VAR, BASE_URL_VAR),
        })
    })?;

    let joined = match configured {
        Some(path) => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ),
        None => base.to_string(),
    };

    if is_http_url(&joined) {
        Ok(joined)
    } else {
        Err(WorkflowError::config(format!(
            "resolved endpoint '{}' is not a valid http(s) URL",
            joined
        )))
    }
}

/// `<scheme>://<host>[:port]` + `path`, used for the liveness probe.
pub fn sibling_url(endpoint: &str, path: &str) -> Result<String> {
    let url = Url::parse(endpoint)
        .map_err(|e| WorkflowError::config(format!("invalid endpoint '{}': {}", endpoint, e)))?;
    let joined = url
        .join(&format!("/{}", path.trim_start_matches('/')))
        .map_err(|e| WorkflowError::config(format!("invalid path '{}': {}", path, e)))?;
    Ok(joined.to_string())
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
