//! Source resolution: command-line operands to named, readable streams.

use orchestrator::{InputSource, ResolvedSource, SourceFailure};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

const STDIN_NAME: &str = "standard input";

/// One input operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Stdin,
    File(PathBuf),
}

impl SourceSpec {
    pub fn from_operand(operand: &Path) -> Self {
        if operand.as_os_str() == "-" {
            Self::Stdin
        } else {
            Self::File(operand.to_path_buf())
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Self::Stdin => STDIN_NAME.to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    /// Open the stream. Failure is carried as a per-source result so the
    /// run can report it and move on.
    pub fn open(&self) -> ResolvedSource<'static> {
        let name = self.display_name();
        match self {
            Self::Stdin => Ok(InputSource::new(name, io::stdin().lock())),
            Self::File(path) => match File::open(path) {
                Ok(file) => Ok(InputSource::new(name, file)),
                Err(err) => Err(SourceFailure::open(name, err)),
            },
        }
    }
}

/// Map operands to specs; no operands means standard input.
pub fn resolve_operands(operands: &[PathBuf]) -> Vec<SourceSpec> {
    if operands.is_empty() {
        return vec![SourceSpec::Stdin];
    }
    operands
        .iter()
        .map(|p| SourceSpec::from_operand(p))
        .collect()
}

/// Open sources one at a time, in order, as the run reaches them.
pub fn open_in_order(specs: &[SourceSpec]) -> impl ExactSizeIterator<Item = ResolvedSource<'static>> + '_ {
    specs.iter().map(SourceSpec::open)
}
