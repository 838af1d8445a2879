use chrono::{DateTime, Local, Utc};

use crate::core::style::{Style, Styler, Tier};

/// Default number of cells in a progress bar.
pub const BAR_WIDTH: usize = 30;

const FILLED: &str = "█";
const EMPTY: &str = "░";

/// Number of filled cells for `percentage`: `floor(width * percentage / 100)`,
/// clamped to `0..=width`.
pub fn filled_cells(percentage: f64, width: usize) -> usize {
    let filled = (width as f64 * percentage / 100.0).floor();
    if filled <= 0.0 {
        0
    } else {
        (filled as usize).min(width)
    }
}

/// Number of filled cells for `value` relative to `max`, computed in integers
/// so that `value == max` always fills the whole bar. `max` is floored at 1.
pub fn scaled_cells(value: u64, max: u64, width: usize) -> usize {
    let max = max.max(1);
    let filled = (width as u128 * value as u128) / max as u128;
    (filled as usize).min(width)
}

/// `█` cells for `filled`, `░` for the rest of `width`.
pub fn bar_cells(filled: usize, width: usize, tier: Tier, styler: &dyn Styler) -> String {
    let filled = filled.min(width);
    let mut out = String::new();
    if filled > 0 {
        out.push_str(&styler.paint(&FILLED.repeat(filled), Style::Tier(tier)));
    }
    if width > filled {
        out.push_str(&styler.paint(&EMPTY.repeat(width - filled), Style::Muted));
    }
    out
}

/// Progress bar colored by the percentage's threshold tier.
pub fn progress_bar(percentage: f64, width: usize, styler: &dyn Styler) -> String {
    bar_cells(
        filled_cells(percentage, width),
        width,
        Tier::from_percentage(percentage),
        styler,
    )
}

/// Percentage label colored by the same tier as its bar.
pub fn percentage_label(percentage: f64, styler: &dyn Styler) -> String {
    styler.paint(
        &format!("{}%", percentage),
        Style::Tier(Tier::from_percentage(percentage)),
    )
}

/// Returns `1,234,567`.
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Returns "in Xd Yh", "in Xh Ym" or "in Xm" relative to `now`. If past,
/// returns "resets now".
pub fn format_reset_countdown(resets_at: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let total_seconds = (*resets_at - *now).num_seconds();

    if total_seconds <= 0 {
        return "resets now".to_string();
    }

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;

    if days > 0 {
        format!("in {}d {}h", days, hours)
    } else if hours > 0 {
        format!("in {}h {}m", hours, minutes)
    } else {
        format!("in {}m", minutes)
    }
}

/// Reset instant in the local zone as `YYYY-MM-DD HH:MM:SS`.
pub fn format_reset_datetime(resets_at: &DateTime<Utc>) -> String {
    resets_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
