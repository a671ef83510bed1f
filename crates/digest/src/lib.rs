//! SOLOR Checksums
//!
//! This crate computes the message digests the rest of the codec builds on: namespace UUIDs
//! hash their seed text with SHA-1, SOLOR IDs hash a UUID, and encrypted credential blobs carry
//! a SHA-1 of their plaintext. Artifact-transfer tooling uses the same code to compare a
//! downloaded file against its published checksum.
//!
//! ## Algorithms
//!
//! Algorithms form a closed set ([`DigestAlgorithm`]). Callers that select an algorithm from
//! configuration text parse it with [`str::parse`], which is the only place an
//! [`DigestError::UnsupportedAlgorithm`] can come from.
//!
//! ## Streaming
//!
//! [`digest_stream`] reads any [`std::io::Read`] in fixed 8 KiB chunks and reports progress
//! after every chunk to a [`ProgressSink`]. The digest never depends on the chunk size or on
//! the sink.
//!
//! ## Example Usage
//!
//! ```
//! use solor_digest::{digest, DigestAlgorithm};
//!
//! let checksum = digest(DigestAlgorithm::Sha1, b"abc");
//! assert_eq!(checksum.to_hex(), "a9993e364706816aba3e25717850c26c9cd0d89d");
//! ```

mod algorithm;
mod stream;

pub use algorithm::{digest, Digest, DigestAlgorithm, Hasher};
pub use stream::{
    digest_file, digest_stream, digest_stream_chunked, parse_checksum_line, verify_file,
    NoProgress, ProgressSink, DEFAULT_CHUNK_SIZE,
};

/// Errors that can occur while computing a digest
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// The algorithm name is not one of the supported digests
    #[error("Unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Streaming was requested with a zero-length buffer
    #[error("Chunk size must be at least one byte")]
    InvalidChunkSize,

    /// The byte source failed before it was read to completion
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for digest operations.
pub type DigestResult<T> = Result<T, DigestError>;
