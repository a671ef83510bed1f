//! RFC 4122 name-based UUID generation.
//!
//! Both generators hash their input, keep the first 16 bytes of the digest, then force the
//! version nibble (high four bits of byte 6) and the IETF variant (top two bits of byte 8 set to
//! `10`). The caller never supplies those bits.

use crate::{UuidError, UuidResult};
use solor_digest::DigestAlgorithm;
use uuid::Uuid;

/// Prefix the legacy SNOMED tooling hashed in front of every SCTID.
const SNOMED_NAME_PREFIX: &str = "org.snomed.";

/// Version nibble for MD5 name-based UUIDs.
const VERSION_MD5: u8 = 3;

/// Version nibble for SHA-1 name-based UUIDs.
const VERSION_SHA1: u8 = 5;

/// Generates a Type 5 (SHA-1) name-based UUID.
///
/// The digest input is the 16 raw bytes of `namespace` (when present) followed by the UTF-8
/// bytes of `name`. With a namespace this is exactly RFC 4122 §4.3; without one the UUID is
/// scoped to the root and cannot coincide with any namespaced UUID except by SHA-1 collision.
///
/// # Arguments
///
/// * `namespace` - Optional scoping UUID.
/// * `name` - Seed text. May be empty.
///
/// # Returns
///
/// The same UUID for the same `(namespace, name)` on every call.
pub fn type_five(namespace: Option<&Uuid>, name: &str) -> Uuid {
    let mut hasher = DigestAlgorithm::Sha1.hasher();
    if let Some(namespace) = namespace {
        hasher.update(namespace.as_bytes());
    }
    hasher.update(name.as_bytes());
    stamp(hasher.finish().as_bytes(), VERSION_SHA1)
}

/// Generates the legacy Type 3 (MD5) UUID for a SNOMED CT identifier.
///
/// Hashes the ISO-8859-1 encoding of `"org.snomed." + sctid` with no namespace. Only kept so
/// that existing SNOMED content keeps its historical UUIDs; new identifiers use
/// [`type_five`].
pub fn type_three(sctid: &str) -> Uuid {
    let mut hasher = DigestAlgorithm::Md5.hasher();
    hasher.update(&latin1_bytes(SNOMED_NAME_PREFIX));
    hasher.update(&latin1_bytes(sctid));
    stamp(hasher.finish().as_bytes(), VERSION_MD5)
}

/// Returns the 16 raw bytes of `uuid`, most significant byte first.
pub fn raw_bytes(uuid: &Uuid) -> [u8; 16] {
    *uuid.as_bytes()
}

/// Rebuilds a UUID from its 16 raw bytes.
///
/// # Errors
///
/// Returns [`UuidError::InvalidLength`] unless `bytes` is exactly 16 bytes long.
pub fn from_raw_bytes(bytes: &[u8]) -> UuidResult<Uuid> {
    Uuid::from_slice(bytes).map_err(|_| UuidError::InvalidLength(bytes.len()))
}

fn stamp(digest: &[u8], version: u8) -> Uuid {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    bytes[6] = (bytes[6] & 0x0f) | (version << 4);
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    Uuid::from_bytes(bytes)
}

/// ISO-8859-1 encoding; code points above U+00FF become `?`.
fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_type_five_matches_rfc_4122_with_namespace() {
        let uuid = type_five(Some(&Uuid::NAMESPACE_DNS), "www.example.com");
        assert_eq!(uuid.to_string(), "2ed6657d-e927-568b-95e1-2665a8aea6a2");
        assert_eq!(uuid, Uuid::new_v5(&Uuid::NAMESPACE_DNS, b"www.example.com"));
    }

    #[test]
    fn test_type_five_version_and_variant() {
        let uuid = type_five(None, "Clinical finding");
        assert_eq!(uuid.get_version(), Some(uuid::Version::Sha1));
        assert_eq!(uuid.get_variant(), uuid::Variant::RFC4122);
    }

    #[test]
    fn test_type_five_root_differs_from_namespaced() {
        let root = type_five(None, "Clinical finding");
        let scoped = type_five(Some(&Uuid::NAMESPACE_OID), "Clinical finding");
        assert_ne!(root, scoped);
    }

    #[test]
    fn test_type_five_empty_name_is_deterministic() {
        assert_eq!(type_five(None, ""), type_five(None, ""));
        assert_ne!(type_five(None, ""), type_five(None, " "));
    }

    #[test]
    fn test_type_five_text_is_canonical() {
        let text = type_five(None, "SOLOR").to_string();
        assert_eq!(text.len(), 36);
        assert_eq!(
            text.split('-').map(str::len).collect::<Vec<_>>(),
            vec![8, 4, 4, 4, 12]
        );
        assert_eq!(text, text.to_lowercase());
    }

    #[test]
    fn test_type_three_snomed_root_concept() {
        let uuid = type_three("138875005");
        assert_eq!(uuid.to_string(), "ee9ac5d2-a07c-3981-a57a-f7f26baf38d8");
        assert_eq!(uuid.get_version(), Some(uuid::Version::Md5));
        assert_eq!(uuid.get_variant(), uuid::Variant::RFC4122);
    }

    #[test]
    fn test_latin1_encoding_replaces_unmappable() {
        assert_eq!(latin1_bytes("é"), vec![0xE9]);
        assert_eq!(latin1_bytes("€"), vec![b'?']);
        assert_eq!(latin1_bytes("ab"), b"ab".to_vec());
    }

    #[test]
    fn test_raw_bytes_round_trip() {
        let uuid = Uuid::NAMESPACE_URL;
        let bytes = raw_bytes(&uuid);
        assert_eq!(from_raw_bytes(&bytes).unwrap(), uuid);
    }

    #[test]
    fn test_from_raw_bytes_rejects_wrong_length() {
        for len in [0usize, 15, 17, 32] {
            let bytes = vec![0u8; len];
            match from_raw_bytes(&bytes) {
                Err(UuidError::InvalidLength(actual)) => assert_eq!(actual, len),
                other => panic!("Expected InvalidLength, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_large_sample_has_no_collisions() {
        let namespaces = [None, Some(Uuid::NAMESPACE_DNS), Some(Uuid::NAMESPACE_OID)];
        let mut seen = HashSet::new();
        for namespace in &namespaces {
            for i in 0..5_000 {
                let uuid = type_five(namespace.as_ref(), &format!("seed-{}", i));
                assert!(seen.insert(uuid), "collision at {:?}/{}", namespace, i);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_type_five_is_deterministic(name in ".*", ns in any::<[u8; 16]>()) {
            let namespace = Uuid::from_bytes(ns);
            prop_assert_eq!(
                type_five(Some(&namespace), &name),
                type_five(Some(&namespace), &name)
            );
            prop_assert_eq!(type_five(None, &name), type_five(None, &name));
        }

        #[test]
        fn prop_type_five_agrees_with_uuid_crate(name in ".*", ns in any::<[u8; 16]>()) {
            let namespace = Uuid::from_bytes(ns);
            prop_assert_eq!(
                type_five(Some(&namespace), &name),
                Uuid::new_v5(&namespace, name.as_bytes())
            );
        }

        #[test]
        fn prop_distinct_names_give_distinct_uuids(a in ".{0,40}", b in ".{0,40}") {
            prop_assume!(a != b);
            prop_assert_ne!(type_five(None, &a), type_five(None, &b));
        }
    }
}
