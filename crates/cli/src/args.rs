use clap::{Parser, ValueEnum};
use core_types::LimitFlags;
use core_types::config::{DefaultsSection, LogFormat};
use orchestrator::RunOptions;
use std::path::PathBuf;

/// Print the first lines or bytes of each input.
#[derive(Parser, Debug, Clone)]
#[command(name = "rhead", version, about = "Print the first part of files")]
pub struct Cli {
    /// Print the first N lines (default 10).
    #[arg(short = 'n', long, value_name = "N", env = "RHEAD_LINES")]
    pub lines: Option<u64>,

    /// Print the first N bytes; wins over --lines.
    #[arg(short = 'c', long, value_name = "N", env = "RHEAD_BYTES")]
    pub bytes: Option<u64>,

    /// Never print headers giving file names.
    #[arg(short, long)]
    pub quiet: bool,

    /// Always print headers giving file names.
    #[arg(short, long)]
    pub verbose: bool,

    /// Stop at the first input that fails instead of moving on.
    #[arg(long)]
    pub fail_fast: bool,

    /// Do not print a blank line before each header.
    #[arg(long)]
    pub no_blank_between: bool,

    /// Cancel the run after this many milliseconds.
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Settings file (TOML).
    #[arg(long, value_name = "PATH", env = "RHEAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format (logs go to stderr).
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormatArg>,

    /// Files to read; `-` or no files means standard input.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    /// Limits from the command line; settings-file limits apply only when
    /// neither `--lines` nor `--bytes` was given.
    pub fn limit_flags(&self, defaults: &DefaultsSection) -> LimitFlags {
        let mut flags = if self.lines.is_some() || self.bytes.is_some() {
            LimitFlags {
                lines: self.lines.unwrap_or(0),
                bytes: self.bytes.unwrap_or(0),
                quiet: defaults.quiet,
            }
        } else {
            defaults.limit_flags()
        };
        flags.quiet |= self.quiet;
        flags
    }

    pub fn run_options(&self, defaults: &DefaultsSection) -> RunOptions {
        let base = RunOptions::from_defaults(defaults);
        RunOptions {
            quiet: base.quiet || self.quiet,
            force_headers: base.force_headers || self.verbose,
            blank_between: base.blank_between && !self.no_blank_between,
            continue_on_error: base.continue_on_error && !self.fail_fast,
            ..base
        }
    }
}
