use std::fmt;

/// Colours shared by every command's output.
pub struct Theme;

impl Theme {
    pub fn primary(text: impl fmt::Display) -> String {
        console::style(text).cyan().bold().to_string()
    }

    pub fn bold(text: impl fmt::Display) -> String {
        console::style(text).bold().to_string()
    }

    pub fn success(text: impl fmt::Display) -> String {
        console::style(text).green().bold().to_string()
    }

    pub fn warning(text: impl fmt::Display) -> String {
        console::style(text).yellow().bold().to_string()
    }

    /// Metadata such as paths and timestamps.
    pub fn muted(text: impl fmt::Display) -> String {
        console::style(text).dim().to_string()
    }
}
