//! # Output Configuration
//!
//! Controls how commands print their reports: colors, and emoji markers
//! versus plain bracketed markers.
//!
//! The `--color` flag decides first. In `auto` mode colors are off when
//! `NO_COLOR` is set, when `CLICOLOR=0`, when `TERM=dumb`, or when stdout
//! is not a terminal (unless `CLICOLOR_FORCE` is set).

use std::env;

use console::Style;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and the `--color`
    /// flag value (`always`, `never` or `auto`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // Presence alone disables colors, see https://no-color.org/
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Make `console` styling follow this configuration process-wide.
    pub fn apply(&self) {
        console::set_colors_enabled(self.use_color);
        console::set_colors_enabled_stderr(self.use_color);
    }

    /// Style for a submodule path in reports.
    pub fn path_style(&self) -> Style {
        Style::new().cyan().bold().force_styling(self.use_color)
    }

    /// Style for commit hashes.
    pub fn hash_style(&self) -> Style {
        Style::new().yellow().force_styling(self.use_color)
    }

    pub fn warning_style(&self) -> Style {
        Style::new().red().force_styling(self.use_color)
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// The emoji when colors are enabled, the plain marker otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Shorten a commit hash for display.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..10).unwrap_or(hash)
}
