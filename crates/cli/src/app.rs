//! Run wiring: settings + arguments in, outcome out.

use crate::args::Cli;
use crate::sources::{open_in_order, resolve_operands};
use anyhow::Result;
use core_types::CancellationToken;
use core_types::config::{AppConfig, load_config};
use orchestrator::{Orchestrator, RunOutcome};
use std::io::Write;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Settings file named by `--config` / `RHEAD_CONFIG`, or built-in defaults.
pub fn load_settings(cli: &Cli) -> Result<AppConfig> {
    Ok(load_config(cli.config.as_deref())?)
}

/// Raise `token` once `after` has elapsed. The timer thread only flips the
/// flag; all reading and writing stays on the calling thread.
pub fn arm_timeout(token: &CancellationToken, after: Duration) {
    let token = token.clone();
    thread::spawn(move || {
        thread::sleep(after);
        token.cancel();
        info!(after_ms = after.as_millis() as u64, "timeout reached; run cancelled");
    });
}

/// Resolve the request and run every operand through the orchestrator.
pub fn execute<W, E>(
    cli: &Cli,
    cfg: &AppConfig,
    cancel: CancellationToken,
    out: &mut W,
    diag: &mut E,
) -> RunOutcome
where
    W: Write + ?Sized,
    E: Write + ?Sized,
{
    let request = cli.limit_flags(&cfg.defaults).resolve();
    let options = cli.run_options(&cfg.defaults);
    let specs = resolve_operands(&cli.files);
    debug!(?request, sources = specs.len(), "starting run");

    Orchestrator::new(request, options)
        .with_cancellation(cancel)
        .run(open_in_order(&specs), out, diag)
}

/// Flush the content sink and report whether the whole run succeeded. A
/// failed final flush fails the run even when every source succeeded.
pub fn finish<W>(out: &mut W, outcome: &RunOutcome) -> bool
where
    W: Write + ?Sized,
{
    if let Err(err) = out.flush() {
        warn!(error = %err, "failed to flush output");
        return false;
    }
    outcome.is_success()
}
