use anyhow::{Context, Result};
use clap::Parser;
use cli::app::{arm_timeout, execute, finish, load_settings};
use cli::args::Cli;
use cli::logging::init_tracing;
use console::style;
use core_types::CancellationToken;
use std::io::{self, BufWriter};
use std::process::ExitCode;
use std::time::Duration;

fn main() -> ExitCode {
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", style("rhead:").for_stderr().red().bold());
            ExitCode::from(2)
        }
    }
}

fn try_main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let cfg = load_settings(&cli).context("failed to load settings")?;
    let format = cli.log_format.map_or(cfg.logging.format, Into::into);
    init_tracing(&cfg.logging, format)?;

    let cancel = CancellationToken::new();
    if let Some(ms) = cli.timeout_ms {
        arm_timeout(&cancel, Duration::from_millis(ms));
    }

    let mut out = BufWriter::new(io::stdout().lock());
    // Unlocked: the subscriber and the timeout thread also write to stderr.
    let mut diag = io::stderr();
    let outcome = execute(&cli, &cfg, cancel, &mut out, &mut diag);

    tracing::debug!(
        processed = outcome.processed,
        failed = outcome.failures.len(),
        "run complete"
    );
    if finish(&mut out, &outcome) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
