//! Digest algorithms and the [`Digest`] value type.

use crate::DigestError;
use digest::DynDigest;
use std::fmt;
use std::str::FromStr;

/// The digests this crate can compute.
///
/// SHA-1 is the default everywhere in the codec because it is part of the
/// identifier contract. MD5 exists for legacy SNOMED UUIDs and for published artifact
/// checksums; SHA-256 for newer artifact repositories.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Md5,
    #[default]
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    /// Canonical display name, matching the names used in published checksum metadata.
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha1 => "SHA-1",
            DigestAlgorithm::Sha256 => "SHA-256",
        }
    }

    /// Length of the raw digest in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 16,
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
        }
    }

    /// Starts an incremental hash computation.
    pub fn hasher(&self) -> Hasher {
        let inner: Box<dyn DynDigest + Send + Sync> = match self {
            DigestAlgorithm::Md5 => Box::new(md5::Md5::default()),
            DigestAlgorithm::Sha1 => Box::new(sha1::Sha1::default()),
            DigestAlgorithm::Sha256 => Box::new(sha2::Sha256::default()),
        };
        Hasher {
            algorithm: *self,
            inner,
            processed: 0,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = DigestError;

    /// Accepts `MD5`, `SHA-1`/`SHA1` and `SHA-256`/`SHA256`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        match normalised.as_str() {
            "MD5" => Ok(DigestAlgorithm::Md5),
            "SHA1" => Ok(DigestAlgorithm::Sha1),
            "SHA256" => Ok(DigestAlgorithm::Sha256),
            _ => Err(DigestError::UnsupportedAlgorithm(s.to_owned())),
        }
    }
}

/// An incremental hash computation for one [`DigestAlgorithm`].
///
/// Obtained from [`DigestAlgorithm::hasher`]. Feeding the same bytes in any split yields the
/// same [`Digest`].
pub struct Hasher {
    algorithm: DigestAlgorithm,
    inner: Box<dyn DynDigest + Send + Sync>,
    processed: u64,
}

impl Hasher {
    /// Feeds `data` into the hash.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
        self.processed += data.len() as u64;
    }

    /// Number of bytes fed so far.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Consumes the hasher and returns the finished digest.
    pub fn finish(self) -> Digest {
        Digest {
            algorithm: self.algorithm,
            bytes: self.inner.finalize().into_vec(),
        }
    }
}

impl fmt::Debug for Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hasher")
            .field("algorithm", &self.algorithm)
            .field("processed", &self.processed)
            .finish()
    }
}

/// A finished message digest.
///
/// Immutable once produced. Equality is by algorithm and bytes. The [`fmt::Display`] form is
/// the lower-case hexadecimal rendering, which is also the published checksum text format.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: DigestAlgorithm,
    bytes: Vec<u8>,
}

impl Digest {
    /// The algorithm that produced this digest.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the digest, returning the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Lower-case hexadecimal rendering of the raw bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Returns `true` if `expected` is this digest in hex, ignoring case and surrounding
    /// whitespace.
    pub fn matches_hex(&self, expected: &str) -> bool {
        let expected = expected.trim();
        expected.len() == self.bytes.len() * 2 && expected.eq_ignore_ascii_case(&self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Computes the digest of an in-memory buffer.
pub fn digest(algorithm: DigestAlgorithm, bytes: &[u8]) -> Digest {
    let mut hasher = algorithm.hasher();
    hasher.update(bytes);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha1_known_vectors() {
        assert_eq!(
            digest(DigestAlgorithm::Sha1, b"abc").to_hex(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            digest(DigestAlgorithm::Sha1, b"").to_hex(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn test_md5_and_sha256_known_vectors() {
        assert_eq!(
            digest(DigestAlgorithm::Md5, b"abc").to_hex(),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            digest(DigestAlgorithm::Sha256, b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_public_types_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DigestAlgorithm>();
        assert_send_sync::<Hasher>();
        assert_send_sync::<Digest>();
    }

    #[test]
    fn test_output_lengths_match_algorithm() {
        for algorithm in [
            DigestAlgorithm::Md5,
            DigestAlgorithm::Sha1,
            DigestAlgorithm::Sha256,
        ] {
            let result = digest(algorithm, b"solor");
            assert_eq!(result.as_bytes().len(), algorithm.output_len());
            assert_eq!(result.to_hex().len(), algorithm.output_len() * 2);
            assert_eq!(result.algorithm(), algorithm);
        }
    }

    #[test]
    fn test_repeated_calls_are_equal() {
        let first = digest(DigestAlgorithm::Sha1, b"the same bytes");
        let second = digest(DigestAlgorithm::Sha1, b"the same bytes");
        assert_eq!(first, second);
    }

    #[test]
    fn test_split_updates_match_single_update() {
        let mut hasher = DigestAlgorithm::Sha1.hasher();
        hasher.update(b"ab");
        hasher.update(b"");
        hasher.update(b"c");
        assert_eq!(hasher.processed(), 3);
        assert_eq!(hasher.finish(), digest(DigestAlgorithm::Sha1, b"abc"));
    }

    #[test]
    fn test_parse_algorithm_names() {
        assert_eq!("SHA-1".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha1);
        assert_eq!("sha1".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha1);
        assert_eq!("MD5".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Md5);
        assert_eq!(
            "sha-256".parse::<DigestAlgorithm>().unwrap(),
            DigestAlgorithm::Sha256
        );
    }

    #[test]
    fn test_parse_unknown_algorithm() {
        let result = "SHA-512".parse::<DigestAlgorithm>();
        match result {
            Err(DigestError::UnsupportedAlgorithm(name)) => assert_eq!(name, "SHA-512"),
            other => panic!("Expected UnsupportedAlgorithm, got {:?}", other),
        }
    }

    #[test]
    fn test_display_names_round_trip() {
        for algorithm in [
            DigestAlgorithm::Md5,
            DigestAlgorithm::Sha1,
            DigestAlgorithm::Sha256,
        ] {
            assert_eq!(
                algorithm.to_string().parse::<DigestAlgorithm>().unwrap(),
                algorithm
            );
        }
    }

    #[test]
    fn test_matches_hex_ignores_case_and_whitespace() {
        let result = digest(DigestAlgorithm::Sha1, b"abc");
        assert!(result.matches_hex("A9993E364706816ABA3E25717850C26C9CD0D89D\n"));
        assert!(!result.matches_hex("a9993e36"));
        assert!(!result.matches_hex(""));
    }

    #[test]
    fn test_display_is_lowercase_hex() {
        let result = digest(DigestAlgorithm::Md5, b"abc");
        assert_eq!(format!("{}", result), result.to_hex());
        assert!(result
            .to_string()
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
    }
}
