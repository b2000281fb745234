use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// 終端機用精簡格式，Lambda 與容器用 JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// `LOG_FORMAT` overrides the binary's default.
    pub fn from_env_or(default: Self) -> Self {
        std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|value| Self::parse(&value))
            .unwrap_or(default)
    }
}

/// sqlx logs every statement at info; keep it quiet unless RUST_LOG asks.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "scrape_workflow=debug,sqlx=warn,info"
    } else {
        "scrape_workflow=info,sqlx=warn,warn"
    }
}

/// Every scrape run carries a `scrape_run{run_id}` span, so both formats
/// tag each event with the run it belongs to.
pub fn init_logger(verbose: bool, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    // 結束時印出 run 的耗時
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false), // CloudWatch 以 JSON 欄位查詢 run_id
            )
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_format() {
        assert_eq!(LogFormat::parse("json"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse(" JSON "), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("text"), Some(LogFormat::Compact));
        assert_eq!(LogFormat::parse("yaml"), None);
    }

    #[test]
    fn test_default_directives_follow_verbosity() {
        assert!(default_directives(true).starts_with("scrape_workflow=debug"));
        assert!(default_directives(false).starts_with("scrape_workflow=info"));
        for verbose in [true, false] {
            assert!(default_directives(verbose).contains("sqlx=warn"));
            assert!(EnvFilter::try_new(default_directives(verbose)).is_ok());
        }
    }
}
