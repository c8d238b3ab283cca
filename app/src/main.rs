use std::path::PathBuf;

use clap::Parser;
use common::config::ReportConfig;
use eyre::Result;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Generate performance histograms from diff statistics CSV file
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Path to the CSV file containing statistics data
    stats: PathBuf,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("perf_histograms=warn,common=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let config = ReportConfig::default();
    match common::report::run(&args.stats, &config) {
        Ok(written) => {
            info!("Generated {} histograms", written.len());
            Ok(())
        }
        Err(err) => {
            error!("{err:#?}");
            Err(err)
        }
    }
}
