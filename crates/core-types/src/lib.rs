//! Core request and cancellation types for rhead.
//!
//! These types are shared by the extractor, the orchestrator, and the CLI.
//! They carry no I/O of their own; the only side effect in this crate is
//! reading the optional settings file in [`config`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

pub mod config;

/// Line limit applied when neither lines nor bytes are configured.
pub const DEFAULT_LINE_LIMIT: u64 = 10;

/// Unit a limit is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Lines,
    Bytes,
}

/// Fully resolved extraction request. Exactly one mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub mode: Mode,
    pub limit: u64,
}

impl ExtractionRequest {
    pub const fn lines(limit: u64) -> Self {
        Self {
            mode: Mode::Lines,
            limit,
        }
    }

    pub const fn bytes(limit: u64) -> Self {
        Self {
            mode: Mode::Bytes,
            limit,
        }
    }
}

/// Raw limit configuration as produced by an argument parser or settings file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitFlags {
    pub lines: u64,
    pub bytes: u64,
    pub quiet: bool,
}

impl LimitFlags {
    /// Normalize the flags into a single request.
    ///
    /// Byte mode wins whenever `bytes` is non-zero. With both limits at zero
    /// the line limit falls back to [`DEFAULT_LINE_LIMIT`].
    pub const fn resolve(&self) -> ExtractionRequest {
        if self.bytes > 0 {
            ExtractionRequest::bytes(self.bytes)
        } else if self.lines == 0 {
            ExtractionRequest::lines(DEFAULT_LINE_LIMIT)
        } else {
            ExtractionRequest::lines(self.lines)
        }
    }
}

/// Returned when a cancellation token has been raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Cooperative cancellation signal.
///
/// Clones share the same flag: any holder may raise it, and the extractor
/// polls it at its suspension points. Once raised it stays raised.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once the token has been raised.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}
