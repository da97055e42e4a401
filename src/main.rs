//! tx-pulse command line
//!
//! Run with: cargo run --features cli -- watch

mod cli;

use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use tx_pulse::config::Config;
use tx_pulse::runtime::{Feed, Runtime, RuntimeView};

use crate::cli::{Cli, Commands};

/// Interval of the headless status line.
const STATUS_INTERVAL: Duration = Duration::from_secs(5);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tx_pulse=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    cli.overrides.apply(&mut config);
    let config = config.validate()?;

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Watch => rt.block_on(run_headless(&config, Feed::Live))?,
        Commands::Simulate => rt.block_on(run_headless(&config, Feed::Simulated))?,
        #[cfg(feature = "gui")]
        Commands::Dashboard { simulate } => {
            let feed = if simulate { Feed::Simulated } else { Feed::Live };
            let runtime = {
                let _guard = rt.enter();
                Runtime::start(&config, feed)
            };
            let result = tx_pulse::app::run(runtime.view());
            rt.block_on(runtime.shutdown());
            result?;
        }
    }
    Ok(())
}

/// Run the pipeline without a window until Ctrl-C.
async fn run_headless(config: &Config, feed: Feed) -> tx_pulse::Result<()> {
    let runtime = Runtime::start(config, feed);
    let view = runtime.view();
    let mut status = tokio::time::interval(STATUS_INTERVAL);
    let mut last_total = 0u64;

    loop {
        tokio::select! {
            _ = status.tick() => {
                last_total = log_status(&view, last_total);
            }
            res = tokio::signal::ctrl_c() => {
                res?;
                info!("interrupted");
                break;
            }
        }
    }

    runtime.shutdown().await;
    Ok(())
}

fn log_status(view: &RuntimeView, last_total: u64) -> u64 {
    let session = view.session.lock();
    let stats = session.stats();
    let total = session.committed_total();
    info!(
        feed = ?view.feed,
        transactions = view.transactions.state().label(),
        network = view.stats.state().label(),
        committed = total,
        "/sec" = format!("{:.1}", (total - last_total) as f64 / STATUS_INTERVAL.as_secs_f64()),
        pending = session.pending(),
        particles = session.particles().len(),
        tps = stats.tps,
        block = stats.block_height,
        validators = stats.active_validator_count,
        latest = ?session.log().latest().map(|ev| ev.hash.as_str()),
        "status"
    );
    total
}
