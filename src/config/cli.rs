use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "scrape-workflow")]
#[command(about = "Trigger, check and report the scheduled RSS scrape")]
pub struct Cli {
    /// Path to TOML configuration file (environment only when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the scrape workflow once
    Run {
        /// Apply the configured retry policy
        #[arg(long)]
        retry: bool,

        /// Skip the health gate for this run
        #[arg(long)]
        skip_health: bool,
    },
    /// Build the daily category report for the last 24 hours
    Daily,
    /// Start the cron harness (scrape every 5 minutes, daily report)
    Schedule,
    /// Load and validate the configuration, then print the resolved endpoints
    CheckConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_flags() {
        let cli = Cli::parse_from([
            "scrape-workflow",
            "--config",
            "workflow.toml",
            "run",
            "--retry",
        ]);
        assert_eq!(cli.config.as_deref(), Some("workflow.toml"));
        assert!(matches!(
            cli.command,
            Command::Run {
                retry: true,
                skip_health: false
            }
        ));
    }

    #[test]
    fn test_parse_check_config() {
        let cli = Cli::parse_from(["scrape-workflow", "-v", "check-config"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::CheckConfig));
    }
}
