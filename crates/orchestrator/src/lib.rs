//! Multi-source orchestration: walk sources in order, emit headers and
//! separators, run the extractor on each, and aggregate failures under the
//! continuation policy. Everything here is single-threaded; output for one
//! source is complete before the next source is touched.

use core_types::{CancellationToken, ExtractionRequest};
use extractor::{ExtractError, extract};
use std::io::{self, Read, Write};
use thiserror::Error;
use tracing::{debug, info, warn};

mod options;

pub use options::RunOptions;

/// A named, readable input stream.
pub struct InputSource<'a> {
    pub name: String,
    pub stream: Box<dyn Read + 'a>,
}

impl<'a> InputSource<'a> {
    pub fn new(name: impl Into<String>, stream: impl Read + 'a) -> Self {
        Self {
            name: name.into(),
            stream: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for InputSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputSource")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open for reading: {0}")]
    Open(#[source] io::Error),
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl SourceError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Extract(err) if err.is_cancelled())
    }
}

/// A source that failed, with the error that stopped it.
#[derive(Debug)]
pub struct SourceFailure {
    pub name: String,
    pub error: SourceError,
}

impl SourceFailure {
    pub fn open(name: impl Into<String>, error: io::Error) -> Self {
        Self {
            name: name.into(),
            error: SourceError::Open(error),
        }
    }
}

/// What the source resolver hands the orchestrator: an open stream, or the
/// reason it could not be opened.
pub type ResolvedSource<'a> = Result<InputSource<'a>, SourceFailure>;

/// Aggregate result of a run.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub sources_total: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failures: Vec<SourceFailure>,
    pub cancelled: bool,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.name.as_str())
    }
}

/// Runs one resolved request over a list of sources.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    request: ExtractionRequest,
    options: RunOptions,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(request: ExtractionRequest, options: RunOptions) -> Self {
        Self {
            request,
            options,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub const fn request(&self) -> ExtractionRequest {
        self.request
    }

    /// Process `sources` in order, writing content to `out` and per-source
    /// error lines to `diag`.
    pub fn run<'a, I, W, E>(&self, sources: I, out: &mut W, diag: &mut E) -> RunOutcome
    where
        I: IntoIterator<Item = ResolvedSource<'a>>,
        I::IntoIter: ExactSizeIterator,
        W: Write + ?Sized,
        E: Write + ?Sized,
    {
        let sources = sources.into_iter();
        let mut outcome = RunOutcome {
            sources_total: sources.len(),
            ..RunOutcome::default()
        };
        let show_headers = self.options.headers_active(outcome.sources_total);
        let mut headers_written = 0usize;

        for resolved in sources {
            outcome.processed += 1;
            let step = resolved.and_then(|mut source| {
                if show_headers {
                    self.write_header(out, &source.name, headers_written > 0)
                        .map_err(|err| failure(&source.name, ExtractError::Write(err)))?;
                    headers_written += 1;
                }
                self.extract_one(&mut source, out)
            });

            match step {
                Ok(()) => outcome.succeeded += 1,
                Err(failed) => {
                    self.report(diag, &failed);
                    let cancelled = failed.error.is_cancelled();
                    outcome.failures.push(failed);
                    if cancelled {
                        info!("run cancelled; remaining sources skipped");
                        outcome.cancelled = true;
                        break;
                    }
                    if !self.options.continue_on_error {
                        debug!("halting after first failure");
                        break;
                    }
                }
            }
        }

        outcome
    }

    fn extract_one<W>(&self, source: &mut InputSource<'_>, out: &mut W) -> Result<(), SourceFailure>
    where
        W: Write + ?Sized,
    {
        debug!(source = %source.name, mode = ?self.request.mode, limit = self.request.limit, "extracting");
        let extraction = extract(&mut *source.stream, out, self.request, &self.cancel);
        debug!(source = %source.name, written = extraction.written, "extraction finished");

        extraction
            .into_result()
            .and_then(|_| out.flush().map_err(ExtractError::Write))
            .map_err(|err| failure(&source.name, err))
    }

    fn write_header<W>(&self, out: &mut W, name: &str, separate: bool) -> io::Result<()>
    where
        W: Write + ?Sized,
    {
        if separate && self.options.blank_between {
            out.write_all(b"\n")?;
        }
        writeln!(out, "==> {name} <==")
    }

    fn report<E>(&self, diag: &mut E, failed: &SourceFailure)
    where
        E: Write + ?Sized,
    {
        debug!(source = %failed.name, error = %failed.error, "source failed");
        let line = format!(
            "{}: {}: {}\n",
            self.options.command_name, failed.name, failed.error
        );
        if let Err(err) = diag.write_all(line.as_bytes()).and_then(|()| diag.flush()) {
            warn!(error = %err, "diagnostic sink rejected write");
        }
    }
}

fn failure(name: &str, err: ExtractError) -> SourceFailure {
    SourceFailure {
        name: name.to_string(),
        error: err.into(),
    }
}
