use colored::Colorize;

/// Threshold band for a usage percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Ok,
    Warning,
    Critical,
}

impl Tier {
    /// `< 50` is ok, `50..80` is a warning, `>= 80` is critical.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage < 50.0 {
            Self::Ok
        } else if percentage < 80.0 {
            Self::Warning
        } else {
            Self::Critical
        }
    }
}

/// Semantic role of a piece of report text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Filled bar cells and percentage labels.
    Tier(Tier),
    /// Report title and horizontal rules.
    Heading,
    /// Section titles.
    Section,
    /// Secondary information such as countdowns.
    Info,
    /// Empty bar cells.
    Muted,
}

/// Output target for styled report text.
pub trait Styler {
    fn paint(&self, text: &str, style: Style) -> String;
}

/// ANSI terminal colors. `colored` only emits them while its global
/// override is on; `cli::output::styler` switches it on.
pub struct AnsiStyler;

impl Styler for AnsiStyler {
    fn paint(&self, text: &str, style: Style) -> String {
        match style {
            Style::Tier(Tier::Ok) => text.bright_green().to_string(),
            Style::Tier(Tier::Warning) => text.bright_yellow().to_string(),
            Style::Tier(Tier::Critical) => text.bright_red().to_string(),
            Style::Heading => text.bright_cyan().bold().to_string(),
            Style::Section => text.bright_blue().bold().to_string(),
            Style::Info => text.bright_cyan().to_string(),
            Style::Muted => text.bright_black().to_string(),
        }
    }
}

/// Leaves text untouched, for pipes and `NO_COLOR`.
pub struct PlainStyler;

impl Styler for PlainStyler {
    fn paint(&self, text: &str, _style: Style) -> String {
        text.to_string()
    }
}
