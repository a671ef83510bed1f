//! Self-checking numeric identifiers.
//!
//! Two decimal identifier formats are supported, both protected by a trailing Verhoeff check
//! digit:
//!
//! - **SCTID** ([`sctid`]): the partitioned SNOMED CT identifier. Parsed, validated, and
//!   generated for long-form (namespaced) partitions.
//! - **SOLOR ID** ([`solor_id`]): a compact identifier derived from a UUID or from a legacy
//!   RxNorm or LOINC code.
//!
//! The check digit itself lives in [`verhoeff`]. It detects every single-digit error and every
//! transposition of adjacent digits.
//!
//! ## Validation vs. construction
//! Predicates (`is_valid`, `verify`) return `bool` and never fail. Constructors and parsers
//! return [`IdentifierResult`].

pub mod sctid;
pub mod solor_id;
pub mod verhoeff;

pub use sctid::{ComponentKind, PartitionType, SctId};
pub use solor_id::{SolorId, SolorIdSource};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentifierError {
    /// Input is empty or contains characters other than decimal digits
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Text cannot represent the requested identifier
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A documented precondition was violated by the caller
    #[error("Illegal argument: {0}")]
    IllegalArgument(String),
}

/// Result type for identifier operations.
pub type IdentifierResult<T> = Result<T, IdentifierError>;
