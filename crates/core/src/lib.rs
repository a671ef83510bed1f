//! # SOLOR Codec Core
//!
//! Binds the codec crates to one startup-resolved [`CodecConfig`].
//!
//! The individual crates are pure and take every parameter explicitly. Applications usually
//! want the same digest algorithm, chunk size, content namespace and key derivation settings
//! throughout a run; [`CodecService`] carries those so callers do not have to thread them
//! through by hand.
//!
//! Stateless operations that need no configuration (SCTID validation, Verhoeff check digits,
//! legacy SNOMED UUIDs) are used directly from `solor_identifiers` and `solor_uuid`.

pub mod config;
mod error;

pub use config::CodecConfig;
pub use error::{CodecError, CodecResult};

use solor_credentials::CredentialCodec;
use solor_digest::{Digest, ProgressSink};
use solor_identifiers::SolorId;
use solor_uuid::ContentSeed;
use std::io::Read;
use std::path::Path;
use uuid::Uuid;

/// Configured entry point for digests, content identifiers and credentials.
#[derive(Clone, Debug, Default)]
pub struct CodecService {
    config: CodecConfig,
    credentials: CredentialCodec,
}

impl CodecService {
    pub fn new(config: CodecConfig) -> Self {
        let credentials = CredentialCodec::new(config.credential_params());
        Self {
            config,
            credentials,
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Digests an in-memory buffer with the configured algorithm.
    pub fn digest(&self, bytes: &[u8]) -> Digest {
        solor_digest::digest(self.config.digest_algorithm(), bytes)
    }

    /// Streams `reader` through the configured algorithm in configured-size chunks.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Digest`] if the reader fails before end of input.
    pub fn digest_reader<R, P>(
        &self,
        reader: R,
        total: Option<u64>,
        progress: &mut P,
    ) -> CodecResult<Digest>
    where
        R: Read,
        P: ProgressSink + ?Sized,
    {
        Ok(solor_digest::digest_stream_chunked(
            self.config.digest_algorithm(),
            reader,
            self.config.chunk_size(),
            total,
            progress,
        )?)
    }

    /// Digests the file at `path` with the configured algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Digest`] if the file cannot be opened or read.
    pub fn digest_file<P>(&self, path: &Path, progress: &mut P) -> CodecResult<Digest>
    where
        P: ProgressSink + ?Sized,
    {
        Ok(solor_digest::digest_file(
            self.config.digest_algorithm(),
            path,
            self.config.chunk_size(),
            progress,
        )?)
    }

    /// Checks the file at `path` against a published hex checksum.
    pub fn verify_file(&self, path: &Path, expected_hex: &str) -> CodecResult<bool> {
        Ok(solor_digest::verify_file(
            self.config.digest_algorithm(),
            path,
            self.config.chunk_size(),
            expected_hex,
        )?)
    }

    /// Derives the UUID of `seed` under the configured content namespace.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Uuid`] if the seed has no non-empty field.
    pub fn content_uuid(&self, seed: &ContentSeed) -> CodecResult<Uuid> {
        Ok(seed.to_uuid(self.config.content_namespace())?)
    }

    /// Derives the SOLOR ID of `seed` by way of its content UUID.
    pub fn content_solor_id(&self, seed: &ContentSeed) -> CodecResult<SolorId> {
        let uuid = self.content_uuid(seed)?;
        let id = SolorId::from_uuid(&uuid)?;
        tracing::debug!(kind = seed.kind(), %uuid, solor_id = %id, "content SOLOR ID assigned");
        Ok(id)
    }

    pub fn credentials(&self) -> &CredentialCodec {
        &self.credentials
    }

    /// Creates a salted credential record for `password`.
    pub fn salted_hash(&self, password: &str) -> CodecResult<String> {
        Ok(self.credentials.salted_hash(password)?)
    }

    /// Returns `true` if `password` matches the stored credential record.
    pub fn check_password(&self, password: &str, stored: &str) -> bool {
        self.credentials.check(password, stored)
    }

    /// Encrypts `plaintext` under `password` into `salt$$$ciphertext` text.
    pub fn encrypt(&self, password: &str, plaintext: &[u8]) -> CodecResult<String> {
        Ok(self.credentials.encrypt(password, plaintext)?)
    }

    /// Decrypts text produced by [`CodecService::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Credential`] on malformed input, a wrong password or a failed
    /// integrity check.
    pub fn decrypt(&self, password: &str, encoded: &str) -> CodecResult<Vec<u8>> {
        Ok(self.credentials.decrypt(password, encoded)?)
    }
}
