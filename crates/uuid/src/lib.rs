//! Deterministic, content-derived UUIDs.
//!
//! Independently built SOLOR instances must agree on the identity of the same concept,
//! description or semantic without asking a central authority for an identifier. They do so
//! by deriving a name-based UUID from the content itself: the same namespace and the same seed
//! text always produce the same UUID, byte for byte, on every platform.
//!
//! This crate provides:
//! - [`namespace`]: RFC 4122 name-based generation. Type 5 (SHA-1) for everything new, and
//!   Type 3 (MD5) only for the legacy SNOMED `org.snomed.<sctid>` identifiers.
//! - [`content`]: one tagged [`ContentSeed`] variant per kind of terminology content, each with
//!   a fixed, normative seed-text layout.
//!
//! ## Canonical UUID text
//! UUIDs render in the RFC 4122 hyphenated lower-case form, for example
//! `2ed6657d-e927-568b-95e1-2665a8aea6a2`. This is what [`Uuid`]'s `Display` produces.
//!
//! ## Determinism
//! Nothing here reads a clock, a random source or process state. Every function is safe to
//! call concurrently.

pub mod content;
pub mod namespace;

// Re-export public types
pub use content::{ContentSeed, DynamicColumn, DynamicDataType};
pub use namespace::{from_raw_bytes, raw_bytes, type_five, type_three};
pub use uuid::Uuid;

/// Error type for UUID operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Raw UUID bytes were not exactly 16 bytes long
    #[error("UUID requires exactly 16 bytes, got {0}")]
    InvalidLength(usize),

    /// A seed had no non-empty field to hash
    #[error("Seed for {0} content has no non-empty field")]
    EmptyInput(&'static str),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;
