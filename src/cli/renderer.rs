use chrono::{DateTime, Utc};

use crate::core::formatter::{
    bar_cells, format_number, format_reset_countdown, format_reset_datetime, percentage_label,
    progress_bar, scaled_cells, BAR_WIDTH,
};
use crate::core::models::quota::{QuotaSnapshot, ServiceUsageDetail};
use crate::core::models::usage::AggregatedUsage;
use crate::core::report::Report;
use crate::core::style::{Style, Styler, Tier};
use crate::core::width::pad_right;
use crate::core::window::DateWindow;

const RULE_WIDTH: usize = 50;
const LABEL_WIDTH: usize = 11;
const MODEL_WIDTH: usize = 15;

pub const NO_QUOTA: &str = "No token quota data found";
pub const NO_USAGE: &str = "No usage data available";

/// Render the whole report as a colored (or plain) string.
///
/// Layout:
/// ```text
///  Z.AI API usage
/// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
/// Token quota
///   Used       █████████████░░░░░░░░░░░░░░░░░ 45% (450 / 1,000)
///   Remaining  550 tokens
///   Resets     2024-03-12 00:00:00 (in 1d 14h)
///
/// Service usage
///   • search-prime    3 tokens
///
/// Daily usage
///   Today      20 tokens
///   Total      5,000 tokens
///
/// Last 7 days
///   Today      ██████░░░░░░░░░░░░░░░░░░░░░░░░ 20
///   Yesterday  ██████████████████████████████ 100
///   Fri        ░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░ 0
/// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
/// ```
pub fn render_report(
    report: &Report,
    show_chart: bool,
    styler: &dyn Styler,
    now: &DateTime<Utc>,
) -> String {
    let rule = styler.paint(&"━".repeat(RULE_WIDTH), Style::Heading);
    let mut sections: Vec<String> = Vec::new();

    sections.push(render_quota(report.quota.as_ref(), styler, now));
    if !report.services.is_empty() {
        sections.push(render_services(&report.services, styler));
    }
    sections.push(render_summary(report, styler));
    if show_chart {
        sections.push(render_chart(report.usage.as_ref(), &report.window, styler));
    }

    format!(
        "{}\n{}\n{}\n{}",
        styler.paint(" Z.AI API usage", Style::Heading),
        rule,
        sections.join("\n\n"),
        rule
    )
}

fn line(label: &str, value: &str, styler: &dyn Styler) -> String {
    format!("  {} {}", styler.paint(&pad_right(label, LABEL_WIDTH - 1), Style::Info), value)
}

fn render_quota(quota: Option<&QuotaSnapshot>, styler: &dyn Styler, now: &DateTime<Utc>) -> String {
    let mut lines = vec![styler.paint("Token quota", Style::Section)];

    let Some(quota) = quota else {
        lines.push(format!("  {}", styler.paint(NO_QUOTA, Style::Tier(Tier::Warning))));
        return lines.join("\n");
    };

    let mut used = format!(
        "{} {}",
        progress_bar(quota.percentage, BAR_WIDTH, styler),
        percentage_label(quota.percentage, styler)
    );
    if !quota.is_percentage_only() {
        used.push_str(&format!(
            " ({} / {})",
            format_number(quota.current_value),
            format_number(quota.usage_ceiling)
        ));
    }
    lines.push(line("Used", &used, styler));

    if !quota.is_percentage_only() {
        lines.push(line(
            "Remaining",
            &format!("{} tokens", format_number(quota.remaining)),
            styler,
        ));
    }

    if let Some(reset) = quota.next_reset() {
        let countdown = format_reset_countdown(&reset, now);
        lines.push(line(
            "Resets",
            &format!(
                "{} {}",
                format_reset_datetime(&reset),
                styler.paint(&format!("({})", countdown), Style::Muted)
            ),
            styler,
        ));
    }

    lines.join("\n")
}

fn render_services(services: &[ServiceUsageDetail], styler: &dyn Styler) -> String {
    let mut lines = vec![styler.paint("Service usage", Style::Section)];
    for detail in services {
        lines.push(format!(
            "  • {} {} tokens",
            pad_right(&detail.model_code, MODEL_WIDTH),
            format_number(detail.tokens)
        ));
    }
    lines.join("\n")
}

fn render_summary(report: &Report, styler: &dyn Styler) -> String {
    let mut lines = vec![styler.paint("Daily usage", Style::Section)];
    match (&report.usage, report.today_tokens()) {
        (Some(usage), Some(today)) => {
            lines.push(line("Today", &format!("{} tokens", format_number(today)), styler));
            lines.push(line(
                "Total",
                &format!("{} tokens", format_number(usage.grand_total)),
                styler,
            ));
        }
        _ => lines.push(format!("  {}", styler.paint(NO_USAGE, Style::Muted))),
    }
    lines.join("\n")
}

fn render_chart(usage: Option<&AggregatedUsage>, window: &DateWindow, styler: &dyn Styler) -> String {
    let mut lines = vec![styler.paint(
        &format!("Last {} days", window.days.len()),
        Style::Section,
    )];

    let Some(usage) = usage else {
        lines.push(format!("  {}", styler.paint(NO_USAGE, Style::Muted)));
        return lines.join("\n");
    };

    // scaled against the busiest day in the whole response, not just the window
    let max = usage.max_daily();
    for (date, label) in &window.days {
        let tokens = usage.tokens_on(date);
        let share = tokens as f64 / max as f64 * 100.0;
        let bar = bar_cells(
            scaled_cells(tokens, max, BAR_WIDTH),
            BAR_WIDTH,
            Tier::from_percentage(share),
            styler,
        );
        lines.push(line(&label.to_string(), &format!("{} {}", bar, format_number(tokens)), styler));
    }
    lines.join("\n")
}
