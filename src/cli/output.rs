use std::io::IsTerminal;

use crate::core::style::{AnsiStyler, PlainStyler, Styler};

/// Resolve the `color` setting (`auto|always|never`) against `NO_COLOR` and
/// whether stdout is a terminal.
pub fn detect_color(setting: &str) -> bool {
    match setting {
        "always" => true,
        "never" => false,
        _ => std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal(),
    }
}

/// Pick the styler for this run. Turning color on also forces `colored`'s
/// override so escapes are emitted even when its own TTY check disagrees.
pub fn styler(use_color: bool) -> Box<dyn Styler> {
    if use_color {
        colored::control::set_override(true);
        Box::new(AnsiStyler)
    } else {
        Box::new(PlainStyler)
    }
}
