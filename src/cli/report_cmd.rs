use anyhow::{Context, Result};
use chrono::Utc;

use crate::cli::output;
use crate::cli::renderer;
use crate::core::api::{UsageApi, ZaiClient};
use crate::core::config::AppConfig;
use crate::core::report::{self, ReportError};
use crate::core::style::Styler;
use crate::core::window::{DateWindow, TimestampZone};

/// Fetch, aggregate and render the report for `window`.
pub async fn report_text<A: UsageApi>(
    api: &A,
    window: DateWindow,
    zone: TimestampZone,
    show_chart: bool,
    styler: &dyn Styler,
) -> Result<String, ReportError> {
    let report = report::collect(api, window, zone).await?;
    Ok(renderer::render_report(&report, show_chart, styler, &Utc::now()))
}

pub async fn run(show_chart: bool, days: Option<u32>) -> Result<()> {
    let mut config = AppConfig::load().with_context(|| {
        format!("Failed to load {}", AppConfig::config_path().display())
    })?;
    config.apply_env();
    config.check()?;

    let token = config.resolve_token()?;
    let client = ZaiClient::for_host(&config.api.host, &token, config.api.timeout())?;

    let days = days.unwrap_or(config.settings.days);
    let window = DateWindow::today(days);
    tracing::debug!(
        start = %window.start_label,
        end = %window.end_label,
        host = %config.api.host,
        "building report"
    );

    let styler = output::styler(output::detect_color(&config.settings.color));
    let text = report_text(
        &client,
        window,
        config.timestamp_zone(),
        show_chart,
        styler.as_ref(),
    )
    .await?;

    println!("{}", text);
    Ok(())
}
