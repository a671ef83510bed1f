//! Streaming digests over byte sources and files
//!
//! Large terminology releases are checksummed after download, so the input is never assumed to
//! fit in memory. Sources are read in fixed-size chunks and each chunk is reported to a
//! [`ProgressSink`] so that callers can drive a progress display. Nothing here spawns threads
//! or retries; a failed read ends the call with [`DigestError::Io`] and no digest.

use crate::{Digest, DigestAlgorithm, DigestError, DigestResult};
use std::fs;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Chunk size used when streaming a source (8 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Receives progress updates while a source is being digested.
///
/// `processed` is the number of bytes consumed so far; `total` is the length supplied by the
/// caller, if known. Implemented for any `FnMut(u64, Option<u64>)`.
pub trait ProgressSink {
    fn report(&mut self, processed: u64, total: Option<u64>);
}

impl<F> ProgressSink for F
where
    F: FnMut(u64, Option<u64>),
{
    fn report(&mut self, processed: u64, total: Option<u64>) {
        self(processed, total)
    }
}

/// A sink that discards progress.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _processed: u64, _total: Option<u64>) {}
}

/// Digests `reader` to completion using [`DEFAULT_CHUNK_SIZE`] chunks.
///
/// # Errors
///
/// Returns [`DigestError::Io`] if the reader fails before end of input.
pub fn digest_stream<R, P>(
    algorithm: DigestAlgorithm,
    reader: R,
    total: Option<u64>,
    progress: &mut P,
) -> DigestResult<Digest>
where
    R: Read,
    P: ProgressSink + ?Sized,
{
    digest_stream_chunked(algorithm, reader, DEFAULT_CHUNK_SIZE, total, progress)
}

/// Digests `reader` to completion, reading at most `chunk_size` bytes at a time.
///
/// # Errors
///
/// Returns [`DigestError::InvalidChunkSize`] if `chunk_size` is zero, or
/// [`DigestError::Io`] if the reader fails before end of input.
pub fn digest_stream_chunked<R, P>(
    algorithm: DigestAlgorithm,
    mut reader: R,
    chunk_size: usize,
    total: Option<u64>,
    progress: &mut P,
) -> DigestResult<Digest>
where
    R: Read,
    P: ProgressSink + ?Sized,
{
    if chunk_size == 0 {
        return Err(DigestError::InvalidChunkSize);
    }

    let mut hasher = algorithm.hasher();
    let mut buffer = vec![0u8; chunk_size];

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(DigestError::Io(e)),
        };
        hasher.update(&buffer[..read]);
        tracing::trace!(processed = hasher.processed(), ?total, "digest progress");
        progress.report(hasher.processed(), total);
    }

    let processed = hasher.processed();
    let digest = hasher.finish();
    tracing::debug!(
        algorithm = %algorithm,
        bytes = processed,
        digest = %digest,
        "digest complete"
    );
    Ok(digest)
}

/// Digests the file at `path`, using its length as the progress total.
///
/// # Errors
///
/// Returns [`DigestError::Io`] if the file cannot be opened or read to completion.
pub fn digest_file<P>(
    algorithm: DigestAlgorithm,
    path: &Path,
    chunk_size: usize,
    progress: &mut P,
) -> DigestResult<Digest>
where
    P: ProgressSink + ?Sized,
{
    let file = fs::File::open(path).map_err(|e| {
        DigestError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open {}: {}", path.display(), e),
        ))
    })?;
    let total = file.metadata().ok().map(|m| m.len());

    digest_stream_chunked(algorithm, file, chunk_size, total, progress).map_err(|e| match e {
        DigestError::Io(io) => DigestError::Io(std::io::Error::new(
            io.kind(),
            format!("Failed to read {}: {}", path.display(), io),
        )),
        other => other,
    })
}

/// Checks the file at `path` against a published hex checksum.
///
/// Returns `Ok(false)` on mismatch; only I/O failures are errors.
pub fn verify_file(
    algorithm: DigestAlgorithm,
    path: &Path,
    chunk_size: usize,
    expected_hex: &str,
) -> DigestResult<bool> {
    let actual = digest_file(algorithm, path, chunk_size, &mut NoProgress)?;
    let matches = actual.matches_hex(expected_hex);
    if !matches {
        tracing::warn!(
            path = %path.display(),
            expected = expected_hex.trim(),
            actual = %actual,
            "checksum mismatch"
        );
    }
    Ok(matches)
}

/// Extracts the hex digest from one line of a published checksum file.
///
/// Accepts the `sha1sum`/`md5sum` formats (`<hex>  <name>`, `<hex> *<name>`) and a bare
/// `<hex>`. Returns the digest in lower case, or `None` if the first field is not an even
/// length run of hex digits.
pub fn parse_checksum_line(line: &str) -> Option<String> {
    let first = line.split_whitespace().next()?;
    let valid = first.len() % 2 == 0 && first.bytes().all(|b| b.is_ascii_hexdigit());
    valid.then(|| first.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest;
    use proptest::prelude::*;
    use std::io::{self, Cursor};
    use tempfile::TempDir;

    /// Reader that fails after yielding `good` bytes.
    struct FailingReader {
        good: usize,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.good == 0 {
                return Err(io::Error::new(ErrorKind::UnexpectedEof, "connection reset"));
            }
            let n = self.good.min(buf.len());
            buf[..n].fill(0xAB);
            self.good -= n;
            Ok(n)
        }
    }

    /// Reader that interrupts every other call.
    struct InterruptingReader {
        inner: Cursor<Vec<u8>>,
        interrupt: bool,
    }

    impl Read for InterruptingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::new(ErrorKind::Interrupted, "signal"));
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_stream_matches_in_memory_digest() {
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let streamed =
            digest_stream(DigestAlgorithm::Sha1, Cursor::new(&data), None, &mut NoProgress)
                .unwrap();
        assert_eq!(streamed, digest(DigestAlgorithm::Sha1, &data));
    }

    #[test]
    fn test_progress_reports_every_chunk() {
        let data = vec![7u8; DEFAULT_CHUNK_SIZE * 2 + 100];
        let mut reports = Vec::new();
        let mut sink = |processed: u64, total: Option<u64>| reports.push((processed, total));

        digest_stream(
            DigestAlgorithm::Sha1,
            Cursor::new(&data),
            Some(data.len() as u64),
            &mut sink,
        )
        .unwrap();

        let total = Some(data.len() as u64);
        assert_eq!(
            reports,
            vec![
                (DEFAULT_CHUNK_SIZE as u64, total),
                (DEFAULT_CHUNK_SIZE as u64 * 2, total),
                (data.len() as u64, total),
            ]
        );
    }

    #[test]
    fn test_empty_source_reports_nothing() {
        let mut calls = 0;
        let mut sink = |_: u64, _: Option<u64>| calls += 1;
        let result =
            digest_stream(DigestAlgorithm::Sha1, io::empty(), Some(0), &mut sink).unwrap();
        assert_eq!(result.to_hex(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_read_failure_returns_io_error() {
        let result = digest_stream(
            DigestAlgorithm::Sha1,
            FailingReader { good: 20_000 },
            None,
            &mut NoProgress,
        );
        assert!(matches!(result, Err(DigestError::Io(_))));
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let data = b"interrupted but complete".to_vec();
        let reader = InterruptingReader {
            inner: Cursor::new(data.clone()),
            interrupt: false,
        };
        let result = digest_stream_chunked(DigestAlgorithm::Md5, reader, 4, None, &mut NoProgress)
            .unwrap();
        assert_eq!(result, digest(DigestAlgorithm::Md5, &data));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let result = digest_stream_chunked(
            DigestAlgorithm::Sha1,
            Cursor::new(b"abc"),
            0,
            None,
            &mut NoProgress,
        );
        assert!(matches!(result, Err(DigestError::InvalidChunkSize)));
    }

    #[test]
    fn test_digest_file_uses_length_as_total() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("release.zip");
        fs::write(&path, vec![1u8; 10_000]).unwrap();

        let mut last = None;
        let mut sink = |processed: u64, total: Option<u64>| last = Some((processed, total));
        let result = digest_file(DigestAlgorithm::Sha256, &path, 4096, &mut sink).unwrap();

        assert_eq!(last, Some((10_000, Some(10_000))));
        assert_eq!(result, digest(DigestAlgorithm::Sha256, &[1u8; 10_000]));
    }

    #[test]
    fn test_digest_file_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.zip");
        let result = digest_file(DigestAlgorithm::Sha1, &path, DEFAULT_CHUNK_SIZE, &mut NoProgress);
        match result {
            Err(DigestError::Io(e)) => {
                assert_eq!(e.kind(), ErrorKind::NotFound);
                assert!(e.to_string().contains("missing.zip"));
            }
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_file_against_published_checksum() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("abc.txt");
        fs::write(&path, b"abc").unwrap();

        assert!(verify_file(
            DigestAlgorithm::Sha1,
            &path,
            DEFAULT_CHUNK_SIZE,
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        )
        .unwrap());
        assert!(!verify_file(
            DigestAlgorithm::Sha1,
            &path,
            1,
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        )
        .unwrap());
    }

    #[test]
    fn test_parse_checksum_line_formats() {
        assert_eq!(
            parse_checksum_line("A9993E364706816ABA3E25717850C26C9CD0D89D  abc.txt").as_deref(),
            Some("a9993e364706816aba3e25717850c26c9cd0d89d")
        );
        assert_eq!(
            parse_checksum_line("900150983cd24fb0d6963f7d28e17f72 *abc.txt").as_deref(),
            Some("900150983cd24fb0d6963f7d28e17f72")
        );
        assert_eq!(
            parse_checksum_line("900150983cd24fb0d6963f7d28e17f72\n").as_deref(),
            Some("900150983cd24fb0d6963f7d28e17f72")
        );
        assert_eq!(parse_checksum_line(""), None);
        assert_eq!(parse_checksum_line("not-a-checksum abc.txt"), None);
        assert_eq!(parse_checksum_line("abc abc.txt"), None);
    }

    proptest! {
        #[test]
        fn prop_digest_independent_of_chunk_size(
            data in prop::collection::vec(any::<u8>(), 0..20_000),
            chunk_size in 1usize..10_000,
        ) {
            let expected = digest(DigestAlgorithm::Sha1, &data);
            let streamed = digest_stream_chunked(
                DigestAlgorithm::Sha1,
                Cursor::new(&data),
                chunk_size,
                None,
                &mut NoProgress,
            )
            .unwrap();
            prop_assert_eq!(streamed, expected);
        }
    }
}
