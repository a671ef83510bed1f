//! Codec runtime configuration.
//!
//! Resolved once at process startup and passed into [`crate::CodecService`]. Parsing works on
//! optional strings rather than reading the environment directly, so that only `main` touches
//! process-wide state and tests can exercise every path without `std::env::set_var`.

use crate::{CodecError, CodecResult};
use solor_credentials::CredentialParams;
use solor_digest::{DigestAlgorithm, DEFAULT_CHUNK_SIZE};
use uuid::Uuid;

/// Codec configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecConfig {
    digest_algorithm: DigestAlgorithm,
    chunk_size: usize,
    credential_params: CredentialParams,
    content_namespace: Option<Uuid>,
}

impl CodecConfig {
    /// Create a new `CodecConfig`.
    ///
    /// `content_namespace` of `None` means content UUIDs are derived without a namespace.
    pub fn new(
        digest_algorithm: DigestAlgorithm,
        chunk_size: usize,
        credential_params: CredentialParams,
        content_namespace: Option<Uuid>,
    ) -> CodecResult<Self> {
        if chunk_size == 0 {
            return Err(CodecError::Config("chunk size must be at least 1".into()));
        }

        Ok(Self {
            digest_algorithm,
            chunk_size,
            credential_params,
            content_namespace,
        })
    }

    pub fn digest_algorithm(&self) -> DigestAlgorithm {
        self.digest_algorithm
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn credential_params(&self) -> CredentialParams {
        self.credential_params
    }

    pub fn content_namespace(&self) -> Option<&Uuid> {
        self.content_namespace.as_ref()
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            digest_algorithm: DigestAlgorithm::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            credential_params: CredentialParams::default(),
            content_namespace: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the default digest algorithm from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns SHA-1.
pub fn digest_algorithm_from_env_value(value: Option<String>) -> CodecResult<DigestAlgorithm> {
    let parsed = non_empty(value)
        .map(|v| v.parse::<DigestAlgorithm>())
        .transpose()
        .map_err(|e| CodecError::Config(e.to_string()))?;

    Ok(parsed.unwrap_or_default())
}

/// Parse the streaming chunk size in bytes.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_CHUNK_SIZE`].
pub fn chunk_size_from_env_value(value: Option<String>) -> CodecResult<usize> {
    let Some(value) = non_empty(value) else {
        return Ok(DEFAULT_CHUNK_SIZE);
    };
    match value.parse::<usize>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(CodecError::Config(format!(
            "chunk size must be a positive integer, got '{}'",
            value
        ))),
    }
}

/// Parse the key derivation parameters from optional iteration and key length values.
///
/// Each missing value falls back to its [`CredentialParams::default`] counterpart.
pub fn credential_params_from_env_values(
    iterations: Option<String>,
    key_bits: Option<String>,
) -> CodecResult<CredentialParams> {
    let defaults = CredentialParams::default();

    let parse = |name: &str, value: Option<String>, fallback: u32| -> CodecResult<u32> {
        non_empty(value)
            .map(|v| {
                v.parse::<u32>().map_err(|_| {
                    CodecError::Config(format!("{} must be an unsigned integer, got '{}'", name, v))
                })
            })
            .transpose()
            .map(|parsed| parsed.unwrap_or(fallback))
    };

    let iterations = parse("iterations", iterations, defaults.iterations())?;
    let key_bits = parse("key bits", key_bits, defaults.key_bits())?;

    CredentialParams::new(iterations, key_bits).map_err(|e| CodecError::Config(e.to_string()))
}

/// Parse the namespace UUID applied to content seeds.
///
/// If `value` is `None` or empty/whitespace, content UUIDs are derived without a namespace.
pub fn content_namespace_from_env_value(value: Option<String>) -> CodecResult<Option<Uuid>> {
    non_empty(value)
        .map(|v| {
            Uuid::parse_str(&v).map_err(|e| {
                CodecError::Config(format!("invalid content namespace '{}': {}", v, e))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.digest_algorithm(), DigestAlgorithm::Sha1);
        assert_eq!(config.chunk_size(), 8192);
        assert_eq!(config.credential_params().iterations(), 10240);
        assert_eq!(config.credential_params().key_bits(), 256);
        assert!(config.content_namespace().is_none());
    }

    #[test]
    fn test_new_rejects_zero_chunk_size() {
        let result = CodecConfig::new(
            DigestAlgorithm::Sha256,
            0,
            CredentialParams::default(),
            None,
        );
        assert!(matches!(result, Err(CodecError::Config(_))));
    }

    #[test]
    fn test_digest_algorithm_from_env_value() {
        assert_eq!(
            digest_algorithm_from_env_value(None).unwrap(),
            DigestAlgorithm::Sha1
        );
        assert_eq!(
            digest_algorithm_from_env_value(Some("   ".into())).unwrap(),
            DigestAlgorithm::Sha1
        );
        assert_eq!(
            digest_algorithm_from_env_value(Some(" sha-256 ".into())).unwrap(),
            DigestAlgorithm::Sha256
        );
        assert!(matches!(
            digest_algorithm_from_env_value(Some("crc32".into())),
            Err(CodecError::Config(_))
        ));
    }

    #[test]
    fn test_chunk_size_from_env_value() {
        assert_eq!(chunk_size_from_env_value(None).unwrap(), DEFAULT_CHUNK_SIZE);
        assert_eq!(chunk_size_from_env_value(Some("4096".into())).unwrap(), 4096);
        assert!(chunk_size_from_env_value(Some("0".into())).is_err());
        assert!(chunk_size_from_env_value(Some("-1".into())).is_err());
        assert!(chunk_size_from_env_value(Some("big".into())).is_err());
    }

    #[test]
    fn test_credential_params_from_env_values() {
        let params = credential_params_from_env_values(None, None).unwrap();
        assert_eq!(params, CredentialParams::default());

        let params = credential_params_from_env_values(Some("1000".into()), None).unwrap();
        assert_eq!(params.iterations(), 1000);
        assert_eq!(params.key_bits(), 256);

        assert!(credential_params_from_env_values(Some("0".into()), None).is_err());
        assert!(credential_params_from_env_values(None, Some("100".into())).is_err());
        assert!(credential_params_from_env_values(Some("ten".into()), None).is_err());
    }

    #[test]
    fn test_content_namespace_from_env_value() {
        assert_eq!(content_namespace_from_env_value(None).unwrap(), None);
        assert_eq!(
            content_namespace_from_env_value(Some("6ba7b810-9dad-11d1-80b4-00c04fd430c8".into()))
                .unwrap(),
            Some(Uuid::NAMESPACE_DNS)
        );
        assert!(matches!(
            content_namespace_from_env_value(Some("not-a-uuid".into())),
            Err(CodecError::Config(_))
        ));
    }
}
