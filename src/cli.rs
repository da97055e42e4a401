use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tx_pulse::config::Config;

#[derive(Parser, Debug)]
#[command(name = "tx-pulse", version, about = "Real-time blockchain transaction visualizer")]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Follow the live analytics stream and log pipeline status
    Watch,
    /// Run the pipeline headless on simulated transactions
    Simulate,
    /// Open the desktop dashboard
    #[cfg(feature = "gui")]
    Dashboard {
        /// Use simulated transactions instead of the live stream
        #[arg(long)]
        simulate: bool,
    },
}

/// Flags that take precedence over `TXPULSE_*` variables.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Analytics WebSocket URL
    #[arg(long, global = true)]
    pub ws_url: Option<String>,
    /// REST API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Stats poll interval in seconds
    #[arg(long, global = true)]
    pub poll_secs: Option<u64>,
    /// Do not reconnect after the stream drops
    #[arg(long, global = true)]
    pub no_reconnect: bool,
    #[arg(long, global = true)]
    pub base_delay_ms: Option<u64>,
    #[arg(long, global = true)]
    pub min_delay_ms: Option<u64>,
    #[arg(long, global = true)]
    pub max_delay_ms: Option<u64>,
    #[arg(long, global = true)]
    pub pending_threshold: Option<u32>,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.ws_url {
            config.ws_url = url.clone();
        }
        if let Some(url) = &self.api_url {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = self.poll_secs {
            config.poll_interval = Duration::from_secs(secs.max(1));
        }
        if self.no_reconnect {
            config.reconnect = false;
        }
        if let Some(ms) = self.base_delay_ms {
            config.throttle.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.min_delay_ms {
            config.throttle.min_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.max_delay_ms {
            config.throttle.max_delay = Duration::from_millis(ms);
        }
        if let Some(threshold) = self.pending_threshold {
            config.throttle.pending_threshold = threshold;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "tx-pulse",
            "watch",
            "--ws-url",
            "ws://example/ws",
            "--base-delay-ms",
            "20",
            "--pending-threshold",
            "4",
            "--no-reconnect",
        ]);
        assert!(matches!(cli.command, Commands::Watch));

        let mut config = Config::default();
        cli.overrides.apply(&mut config);
        assert_eq!(config.ws_url, "ws://example/ws");
        assert_eq!(config.throttle.base_delay, Duration::from_millis(20));
        assert_eq!(config.throttle.pending_threshold, 4);
        assert!(!config.reconnect);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
