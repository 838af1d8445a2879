mod cli;
mod core;

use clap::Parser;
use crate::core::window::MAX_DAYS;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "zusage", about = "Z.AI API quota and daily token usage", version)]
struct Cli {
    /// Show a per-day usage chart
    #[arg(short, long)]
    chart: bool,

    /// Number of days in the chart (default: 7, or `days` from the config file)
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DAYS))
    )]
    days: Option<u32>,
}

/// Log to stderr, filtered by `RUST_LOG` (default: warn).
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging();

    cli::report_cmd::run(cli.chart, cli.days).await
}
