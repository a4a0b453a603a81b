use core_types::config::DefaultsSection;

const DEFAULT_COMMAND_NAME: &str = "rhead";

/// Header, separator, and continuation policy for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Prefix for diagnostic lines.
    pub command_name: String,
    /// Suppresses headers outright, even when forced.
    pub quiet: bool,
    /// Emit a header even when only one source is present.
    pub force_headers: bool,
    /// Blank line before every header except the first.
    pub blank_between: bool,
    pub continue_on_error: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            command_name: DEFAULT_COMMAND_NAME.to_string(),
            quiet: false,
            force_headers: false,
            blank_between: true,
            continue_on_error: true,
        }
    }
}

impl RunOptions {
    pub fn from_defaults(defaults: &DefaultsSection) -> Self {
        Self {
            quiet: defaults.quiet,
            force_headers: defaults.verbose,
            blank_between: defaults.blank_between,
            continue_on_error: defaults.continue_on_error,
            ..Self::default()
        }
    }

    pub fn with_command_name(mut self, name: impl Into<String>) -> Self {
        self.command_name = name.into();
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_force_headers(mut self, force: bool) -> Self {
        self.force_headers = force;
        self
    }

    pub fn with_blank_between(mut self, blank: bool) -> Self {
        self.blank_between = blank;
        self
    }

    pub fn with_continue_on_error(mut self, cont: bool) -> Self {
        self.continue_on_error = cont;
        self
    }

    /// Whether headers are written for a run over `source_count` sources.
    pub const fn headers_active(&self, source_count: usize) -> bool {
        !self.quiet && (source_count > 1 || self.force_headers)
    }
}
