//! Password hashing and password-based encryption.
//!
//! Two record formats, both plain text so they can be stored in configuration files:
//!
//! ```text
//! credential record:  base64url(salt) $$$ base64url(pbkdf2 key)
//! encrypted blob:     base64url(salt) $$$ base64url(ciphertext)
//! ```
//!
//! Salts are 32 bytes from the thread-local CSPRNG. Keys are PBKDF2-HMAC-SHA1, 10240
//! iterations, 256 bits unless [`CredentialParams`] says otherwise.
//!
//! Encryption is AES-256-CBC with PKCS#7 padding. CBC carries no authentication, so the
//! plaintext is extended with its own SHA-1 before encryption and checked after decryption;
//! this is what reports a wrong password whose key happens to produce valid padding.

mod codec;

pub use codec::{
    hash, CredentialCodec, CredentialParams, DEFAULT_ITERATIONS, DEFAULT_KEY_BITS, SALT_LEN,
    SEPARATOR,
};

/// Errors that can occur while hashing, encrypting or decrypting.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The password was empty
    #[error("Password cannot be empty")]
    EmptyPassword,

    /// Iteration count or key length cannot be used
    #[error("Invalid key derivation parameters: {0}")]
    InvalidParameters(String),

    /// The encoded text is not `salt$$$payload` with base64 halves
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The cipher rejected the ciphertext under the derived key
    #[error("Wrong password")]
    WrongPassword,

    /// The decrypted payload is too short to carry its checksum
    #[error("Decrypted data is truncated ({0} bytes)")]
    TruncatedData(usize),

    /// The decrypted payload does not match its embedded checksum
    #[error("Integrity check failed")]
    IntegrityCheckFailed,
}

/// Result type for credential operations.
pub type CredentialResult<T> = Result<T, CredentialError>;
