//! Bounded prefix extraction.
//!
//! Copies the first `limit` lines or bytes of a stream into an output sink
//! and stops. Partial output is never rolled back: when a read, a write, or
//! a cancellation interrupts the copy, whatever was already written stays in
//! the sink and the returned [`Extraction`] says how much that was.

use core_types::{CancellationToken, Cancelled, ExtractionRequest, Mode};
use std::io::{self, BufRead, BufReader, ErrorKind, Read, Write};
use thiserror::Error;
use tracing::debug;

const CHUNK_SIZE: usize = 8 * 1024;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("read error: {0}")]
    Read(#[source] io::Error),
    #[error("write error: {0}")]
    Write(#[source] io::Error),
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl ExtractError {
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Outcome of one extraction: units written plus the error that stopped it, if any.
#[derive(Debug)]
pub struct Extraction {
    pub written: u64,
    pub error: Option<ExtractError>,
}

impl Extraction {
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<u64, ExtractError> {
        match self.error {
            None => Ok(self.written),
            Some(err) => Err(err),
        }
    }

    fn from_step(written: u64, step: Result<(), ExtractError>) -> Self {
        if let Err(err) = &step
            && err.is_cancelled()
        {
            debug!(written, "extraction cancelled");
        }
        Self {
            written,
            error: step.err(),
        }
    }
}

/// Emit the bounded prefix of `reader` selected by `request` into `out`.
///
/// The token is polled before the first read and, in line mode, again before
/// every following line.
pub fn extract<R, W>(
    reader: &mut R,
    out: &mut W,
    request: ExtractionRequest,
    cancel: &CancellationToken,
) -> Extraction
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    match request.mode {
        Mode::Lines => extract_lines(&mut BufReader::new(reader), out, request.limit, cancel),
        Mode::Bytes => extract_bytes(reader, out, request.limit, cancel),
    }
}

/// Copy up to `limit` lines, each re-terminated with a single `\n`.
pub fn extract_lines<R, W>(
    reader: &mut R,
    out: &mut W,
    limit: u64,
    cancel: &CancellationToken,
) -> Extraction
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    let mut written = 0;
    let step = copy_lines(reader, out, limit, cancel, &mut written);
    Extraction::from_step(written, step)
}

/// Copy up to `limit` bytes verbatim. A short stream is not an error.
pub fn extract_bytes<R, W>(
    reader: &mut R,
    out: &mut W,
    limit: u64,
    cancel: &CancellationToken,
) -> Extraction
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut written = 0;
    let step = copy_bytes(reader, out, limit, cancel, &mut written);
    Extraction::from_step(written, step)
}

fn copy_lines<R, W>(
    reader: &mut R,
    out: &mut W,
    limit: u64,
    cancel: &CancellationToken,
    written: &mut u64,
) -> Result<(), ExtractError>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    cancel.check()?;
    let mut line = Vec::new();
    while *written < limit {
        if *written > 0 {
            cancel.check()?;
        }
        line.clear();
        if reader.read_until(b'\n', &mut line).map_err(ExtractError::Read)? == 0 {
            break;
        }
        strip_terminator(&mut line);
        line.push(b'\n');
        out.write_all(&line).map_err(ExtractError::Write)?;
        *written += 1;
    }
    Ok(())
}

fn copy_bytes<R, W>(
    reader: &mut R,
    out: &mut W,
    limit: u64,
    cancel: &CancellationToken,
    written: &mut u64,
) -> Result<(), ExtractError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    cancel.check()?;
    let mut buf = [0u8; CHUNK_SIZE];
    while *written < limit {
        let want = usize::try_from(limit - *written).map_or(CHUNK_SIZE, |n| n.min(CHUNK_SIZE));
        let n = match reader.read(&mut buf[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(ExtractError::Read(err)),
        };
        out.write_all(&buf[..n]).map_err(ExtractError::Write)?;
        *written += n as u64;
    }
    Ok(())
}

/// Drop a trailing `\n`, then one trailing `\r`. An unterminated final
/// line loses its `\r` too.
fn strip_terminator(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Yields `data`, then fails every later read.
    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl FailingReader {
        fn new(data: &str) -> Self {
            Self {
                data: Cursor::new(data.as_bytes().to_vec()),
            }
        }
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::other("read failed")),
                n => Ok(n),
            }
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("write failed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Raises the token once `after` newlines have been written.
    struct CancellingWriter {
        inner: Vec<u8>,
        token: CancellationToken,
        after: usize,
    }

    impl Write for CancellingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.inner.extend_from_slice(buf);
            if self.inner.iter().filter(|b| **b == b'\n').count() >= self.after {
                self.token.cancel();
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run(input: &str, request: ExtractionRequest) -> (String, Extraction) {
        let mut out = Vec::new();
        let result = extract(
            &mut input.as_bytes(),
            &mut out,
            request,
            &CancellationToken::new(),
        );
        (String::from_utf8(out).unwrap(), result)
    }

    #[test]
    fn default_limit_keeps_first_ten_lines() {
        let input: String = (1..=12).map(|i| format!("{i}\n")).collect();
        let request = core_types::LimitFlags::default().resolve();
        let (out, result) = run(&input, request);

        let expected: String = (1..=10).map(|i| format!("{i}\n")).collect();
        assert_eq!(out, expected);
        assert_eq!(result.written, 10);
        assert!(result.is_ok());
    }

    #[test]
    fn byte_limit_cuts_mid_line() {
        let (out, result) = run(
            "Hello World! This is a test.",
            ExtractionRequest::bytes(12),
        );
        assert_eq!(out, "Hello World!");
        assert_eq!(result.written, 12);
        assert!(result.is_ok());
    }

    #[test]
    fn short_input_is_returned_whole() {
        let (out, result) = run("a\nb\n", ExtractionRequest::lines(5));
        assert_eq!(out, "a\nb\n");
        assert_eq!(result.written, 2);

        let (out, result) = run("abc", ExtractionRequest::bytes(100));
        assert_eq!(out, "abc");
        assert_eq!(result.written, 3);
        assert!(result.is_ok());
    }

    #[test]
    fn zero_limits_emit_nothing() {
        let (out, result) = run("abc\n", ExtractionRequest::bytes(0));
        assert!(out.is_empty());
        assert!(result.is_ok());

        let (out, result) = run("abc\n", ExtractionRequest::lines(0));
        assert!(out.is_empty());
        assert!(result.is_ok());
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let (out, result) = run("", ExtractionRequest::lines(10));
        assert!(out.is_empty());
        assert_eq!(result.written, 0);
        assert!(result.is_ok());
    }

    #[test]
    fn line_terminators_are_normalized() {
        let (out, _) = run("one\r\ntwo\nthree", ExtractionRequest::lines(10));
        assert_eq!(out, "one\ntwo\nthree\n");
    }

    #[test]
    fn carriage_return_on_unterminated_last_line_is_dropped() {
        let (out, _) = run("one\r\ntwo\r", ExtractionRequest::lines(10));
        assert_eq!(out, "one\ntwo\n");

        let (out, _) = run("a\r\r\n", ExtractionRequest::lines(1));
        assert_eq!(out, "a\r\n");
    }

    #[test]
    fn blank_and_whitespace_lines_survive() {
        let (out, _) = run("a\n\n  b  \n\t\n", ExtractionRequest::lines(4));
        assert_eq!(out, "a\n\n  b  \n\t\n");
    }

    #[test]
    fn non_utf8_bytes_pass_through() {
        let input = [0xffu8, 0xfe, b'\n', b'x', b'\n'];
        let mut out = Vec::new();
        let result = extract(
            &mut &input[..],
            &mut out,
            ExtractionRequest::lines(1),
            &CancellationToken::new(),
        );
        assert_eq!(out, vec![0xff, 0xfe, b'\n']);
        assert_eq!(result.written, 1);
    }

    #[test]
    fn unicode_lines_are_byte_identical() {
        let (out, _) = run("こんにちは\n世界 🌍\nمرحبا\n", ExtractionRequest::lines(2));
        assert_eq!(out, "こんにちは\n世界 🌍\n");
    }

    #[test]
    fn very_long_line_is_kept_intact() {
        let long = "a".repeat(100_000);
        let (out, _) = run(&format!("{long}\nshort\n"), ExtractionRequest::lines(1));
        assert_eq!(out, format!("{long}\n"));
    }

    #[test]
    fn read_failure_keeps_emitted_lines() {
        let mut reader = FailingReader::new("1\n2\n");
        let mut out = Vec::new();
        let result = extract(
            &mut reader,
            &mut out,
            ExtractionRequest::lines(10),
            &CancellationToken::new(),
        );

        assert_eq!(out, b"1\n2\n");
        assert_eq!(result.written, 2);
        let err = result.into_result().unwrap_err();
        assert!(matches!(err, ExtractError::Read(_)));
        assert!(err.to_string().contains("read failed"));
    }

    #[test]
    fn read_failure_in_byte_mode() {
        let mut reader = FailingReader::new("abc");
        let mut out = Vec::new();
        let result = extract(
            &mut reader,
            &mut out,
            ExtractionRequest::bytes(10),
            &CancellationToken::new(),
        );
        assert_eq!(out, b"abc");
        assert!(matches!(result.error, Some(ExtractError::Read(_))));
    }

    #[test]
    fn write_failure_is_reported() {
        let result = extract(
            &mut "test\n".as_bytes(),
            &mut FailingWriter,
            ExtractionRequest::lines(10),
            &CancellationToken::new(),
        );
        assert_eq!(result.written, 0);
        let err = result.into_result().unwrap_err();
        assert!(matches!(err, ExtractError::Write(_)));
        assert!(err.to_string().contains("write failed"));
    }

    #[test]
    fn cancelled_before_start_writes_nothing() {
        let token = CancellationToken::new();
        token.cancel();

        for request in [ExtractionRequest::lines(5), ExtractionRequest::bytes(5)] {
            let mut out = Vec::new();
            let result = extract(&mut "a\nb\nc\n".as_bytes(), &mut out, request, &token);
            assert!(out.is_empty());
            assert_eq!(result.written, 0);
            assert!(result.error.as_ref().is_some_and(ExtractError::is_cancelled));
        }
    }

    #[test]
    fn cancelled_mid_stream_keeps_k_lines() {
        let token = CancellationToken::new();
        let mut out = CancellingWriter {
            inner: Vec::new(),
            token: token.clone(),
            after: 3,
        };
        let input: String = (1..=8).map(|i| format!("{i}\n")).collect();

        let result = extract(
            &mut input.as_bytes(),
            &mut out,
            ExtractionRequest::lines(6),
            &token,
        );

        assert_eq!(out.inner, b"1\n2\n3\n");
        assert_eq!(result.written, 3);
        assert!(result.error.as_ref().is_some_and(ExtractError::is_cancelled));
    }

    #[test]
    fn cancellation_after_final_line_is_not_observed() {
        let token = CancellationToken::new();
        let mut out = CancellingWriter {
            inner: Vec::new(),
            token: token.clone(),
            after: 2,
        };
        let result = extract(
            &mut "a\nb\nc\n".as_bytes(),
            &mut out,
            ExtractionRequest::lines(2),
            &token,
        );
        assert_eq!(result.written, 2);
        assert!(result.is_ok());
    }
}
