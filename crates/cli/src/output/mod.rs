//! Output formatting utilities
//!
//! This module provides formatters for CLI output in both human-readable
//! and JSON formats.

mod formatter;

pub use formatter::Formatter;

/// Output configuration derived from CLI flags and config defaults
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Suppress non-error output
    pub quiet: bool,
}

impl OutputConfig {
    /// Fill in what the command line left unset from the config file
    pub fn with_defaults(self, defaults: &s3ops_core::config::Defaults) -> Self {
        self.resolve(defaults, console::Term::stdout().is_term())
    }

    /// `--no-color` always wins; otherwise `color` decides, with `auto`
    /// coloring only when stdout is a terminal.
    fn resolve(mut self, defaults: &s3ops_core::config::Defaults, stdout_is_term: bool) -> Self {
        if defaults.output.eq_ignore_ascii_case("json") {
            self.json = true;
        }
        match defaults.color.to_ascii_lowercase().as_str() {
            "never" => self.no_color = true,
            "always" => {}
            _ => self.no_color |= !stdout_is_term,
        }
        self
    }
}
