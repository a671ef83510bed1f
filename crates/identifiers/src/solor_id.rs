//! SOLOR IDs: compact decimal identifiers with a Verhoeff check digit.
//!
//! Every SOLOR ID ends in a two-digit source marker followed by the check digit:
//!
//! | Source  | Marker | Payload                                  |
//! |---------|--------|------------------------------------------|
//! | RxNorm  | `97`   | the RXCUI                                |
//! | LOINC   | `98`   | the LOINC number with its `-` removed    |
//! | UUID    | `99`   | 48 bits of a salted SHA-1 of the UUID     |
//!
//! The UUID derivation is fixed bit for bit. Changing any step changes every identifier ever
//! issued, so the arithmetic in [`SolorId::from_uuid`] must stay exactly as written.

use crate::verhoeff;
use crate::{IdentifierError, IdentifierResult};
use solor_digest::DigestAlgorithm;
use solor_uuid::{raw_bytes, Uuid};
use std::{fmt, str::FromStr};

/// Appended to the UUID bytes before hashing.
const UUID_SALT: &str = "sh.isaac.longid";

/// Keeps the low 48 bits of the hashed value (the top two bytes are zeroed).
const LOW_48_BITS: u64 = 0x0000_FFFF_FFFF_FFFF;

/// Replaces the final three decimal digits of the hashed value. The last `0` is
/// then dropped, leaving the `99` marker.
const UUID_TAIL: u64 = 990;

const RXNORM_MARKER: &str = "97";
const LOINC_MARKER: &str = "98";
const UUID_MARKER: &str = "99";

/// Where a SOLOR ID came from, read off its marker digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SolorIdSource {
    RxNorm,
    Loinc,
    Uuid,
    Unknown,
}

/// A SOLOR ID. Opaque decimal text whose last digit is a Verhoeff check digit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SolorId(String);

impl SolorId {
    /// Derives the SOLOR ID of a UUID.
    ///
    /// 1. SHA-1 over the 16 raw UUID bytes followed by the UTF-8 bytes of `sh.isaac.longid`.
    /// 2. Read the first 8 digest bytes as an unsigned big-endian integer.
    /// 3. Zero its top two bytes.
    /// 4. Replace its last three decimal digits with `990`.
    /// 5. Drop the final digit and append the Verhoeff check digit.
    pub fn from_uuid(uuid: &Uuid) -> IdentifierResult<Self> {
        let mut hasher = DigestAlgorithm::Sha1.hasher();
        hasher.update(&raw_bytes(uuid));
        hasher.update(UUID_SALT.as_bytes());
        let digest = hasher.finish();

        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        let mut value = u64::from_be_bytes(head) & LOW_48_BITS;
        value = value - value % 1000 + UUID_TAIL;

        let mut payload = value.to_string();
        payload.pop();
        Self::with_check_digit(&payload)
    }

    /// Builds the SOLOR ID of an RxNorm concept unique identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidInput`] if `rxcui` is empty or not decimal.
    pub fn from_rxnorm_id(rxcui: &str) -> IdentifierResult<Self> {
        if rxcui.is_empty() || !rxcui.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdentifierError::InvalidInput(format!(
                "RxNorm id must be decimal digits, got: '{}'",
                rxcui
            )));
        }
        Self::with_check_digit(&format!("{}{}", rxcui, RXNORM_MARKER))
    }

    /// Builds the SOLOR ID of a LOINC number such as `8867-4`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidFormat`] unless `loinc` is decimal digits followed by
    /// `-` and a single check digit.
    pub fn from_loinc_id(loinc: &str) -> IdentifierResult<Self> {
        let invalid = || {
            IdentifierError::InvalidFormat(format!(
                "LOINC number must end in '-<digit>', got: '{}'",
                loinc
            ))
        };

        let (stem, check) = loinc.rsplit_once('-').ok_or_else(invalid)?;
        let stem_ok = !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit());
        let check_ok = check.len() == 1 && check.bytes().all(|b| b.is_ascii_digit());
        if !stem_ok || !check_ok {
            return Err(invalid());
        }

        Self::with_check_digit(&format!("{}{}{}", stem, check, LOINC_MARKER))
    }

    /// Validates existing SOLOR ID text.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidFormat`] if the check digit does not verify.
    pub fn parse(text: &str) -> IdentifierResult<Self> {
        if Self::is_valid(text) {
            return Ok(Self(text.to_owned()));
        }
        Err(IdentifierError::InvalidFormat(format!(
            "SOLOR ID check digit mismatch: '{}'",
            text
        )))
    }

    /// Returns `true` if `text` is decimal and its check digit verifies.
    pub fn is_valid(text: &str) -> bool {
        verhoeff::verify(text)
    }

    /// The source marked by the two digits before the check digit.
    pub fn source(&self) -> SolorIdSource {
        let len = self.0.len();
        if len < 3 {
            return SolorIdSource::Unknown;
        }
        match &self.0[len - 3..len - 1] {
            RXNORM_MARKER => SolorIdSource::RxNorm,
            LOINC_MARKER => SolorIdSource::Loinc,
            UUID_MARKER => SolorIdSource::Uuid,
            _ => SolorIdSource::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn with_check_digit(payload: &str) -> IdentifierResult<Self> {
        verhoeff::append_check_digit(payload).map(Self)
    }
}

impl fmt::Display for SolorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SolorId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SolorId::parse(s)
    }
}

impl AsRef<str> for SolorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
