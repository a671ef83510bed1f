//! SNOMED CT identifiers (SCTIDs).
//!
//! An SCTID is a decimal string laid out, most significant digit first, as:
//!
//! ```text
//! short form:  <item id><partition:2><check:1>
//! long form:   <item id><namespace:7><partition:2><check:1>
//! ```
//!
//! The first partition digit selects the form (`0` short, `1` long); the second selects the
//! kind of component. The check digit is Verhoeff over every preceding digit.
//!
//! ## Valid range
//! SCTIDs are between 6 and 18 digits: the numeric value lies in
//! `[100000, 999999999999999999]`. Long-form values need at least 11 digits to hold a one
//! digit item id, the namespace, the partition and the check digit.

use crate::verhoeff;
use crate::{IdentifierError, IdentifierResult};
use solor_uuid::{type_three, Uuid};
use std::{fmt, str::FromStr};

/// Smallest value an SCTID can take.
const MIN_SCTID: u64 = 100_000;

/// Largest value an SCTID can take.
const MAX_SCTID: u64 = 999_999_999_999_999_999;

/// Digits in a long-form namespace.
const NAMESPACE_LEN: usize = 7;

/// Minimum length of a long-form SCTID.
const MIN_LONG_FORM_LEN: usize = 11;

/// Kind of component an SCTID partition identifies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentKind {
    Concept,
    Description,
    Relationship,
    Subset,
    CrossMapSet,
    CrossMapTarget,
}

impl ComponentKind {
    fn digit(&self) -> u8 {
        match self {
            ComponentKind::Concept => 0,
            ComponentKind::Description => 1,
            ComponentKind::Relationship => 2,
            ComponentKind::Subset => 3,
            ComponentKind::CrossMapSet => 4,
            ComponentKind::CrossMapTarget => 5,
        }
    }

    fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(ComponentKind::Concept),
            1 => Some(ComponentKind::Description),
            2 => Some(ComponentKind::Relationship),
            3 => Some(ComponentKind::Subset),
            4 => Some(ComponentKind::CrossMapSet),
            5 => Some(ComponentKind::CrossMapTarget),
            _ => None,
        }
    }
}

/// The two-digit partition identifier of an SCTID.
///
/// The set is closed: six component kinds, each in short or long form. Use the associated
/// constants rather than building values by hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionType {
    kind: ComponentKind,
    long_form: bool,
}

impl PartitionType {
    pub const CONCEPT: Self = Self::short(ComponentKind::Concept);
    pub const DESCRIPTION: Self = Self::short(ComponentKind::Description);
    pub const RELATIONSHIP: Self = Self::short(ComponentKind::Relationship);
    pub const SUBSET: Self = Self::short(ComponentKind::Subset);
    pub const CROSS_MAP_SET: Self = Self::short(ComponentKind::CrossMapSet);
    pub const CROSS_MAP_TARGET: Self = Self::short(ComponentKind::CrossMapTarget);
    pub const CONCEPT_LONG: Self = Self::long(ComponentKind::Concept);
    pub const DESCRIPTION_LONG: Self = Self::long(ComponentKind::Description);
    pub const RELATIONSHIP_LONG: Self = Self::long(ComponentKind::Relationship);
    pub const SUBSET_LONG: Self = Self::long(ComponentKind::Subset);
    pub const CROSS_MAP_SET_LONG: Self = Self::long(ComponentKind::CrossMapSet);
    pub const CROSS_MAP_TARGET_LONG: Self = Self::long(ComponentKind::CrossMapTarget);

    const fn short(kind: ComponentKind) -> Self {
        Self {
            kind,
            long_form: false,
        }
    }

    const fn long(kind: ComponentKind) -> Self {
        Self {
            kind,
            long_form: true,
        }
    }

    /// Parses the two partition digits, e.g. `"00"` or `"10"`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidFormat`] for anything outside the closed set.
    pub fn from_digits(digits: &str) -> IdentifierResult<Self> {
        let unknown = || IdentifierError::InvalidFormat(format!("unknown partition '{}'", digits));
        let bytes = digits.as_bytes();
        if bytes.len() != 2 {
            return Err(unknown());
        }
        let long_form = match bytes[0] {
            b'0' => false,
            b'1' => true,
            _ => return Err(unknown()),
        };
        let kind = bytes[1]
            .checked_sub(b'0')
            .and_then(ComponentKind::from_digit)
            .ok_or_else(unknown)?;
        Ok(Self { kind, long_form })
    }

    /// The two partition digits.
    pub fn digits(&self) -> String {
        format!("{}{}", u8::from(self.long_form), self.kind.digit())
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Long-form partitions carry a 7-digit namespace.
    pub fn is_long_form(&self) -> bool {
        self.long_form
    }

    pub fn to_long_form(self) -> Self {
        Self::long(self.kind)
    }

    pub fn to_short_form(self) -> Self {
        Self::short(self.kind)
    }
}

impl fmt::Display for PartitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits())
    }
}

/// A parsed, validated SCTID.
///
/// Only obtainable through [`SctId::parse`], so every value satisfies [`is_valid`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SctId {
    text: String,
    item_id: u64,
    namespace: Option<String>,
    partition: PartitionType,
    check_digit: u8,
}

impl SctId {
    /// Parses an SCTID, re-deriving its item id, namespace and partition.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::InvalidFormat`] if `text` is not a valid SCTID.
    pub fn parse(text: &str) -> IdentifierResult<Self> {
        let partition = validate(text)?;
        let len = text.len();
        let (item_text, namespace) = if partition.is_long_form() {
            let namespace_start = len - 3 - NAMESPACE_LEN;
            (
                &text[..namespace_start],
                Some(text[namespace_start..len - 3].to_owned()),
            )
        } else {
            (&text[..len - 3], None)
        };
        let item_id = item_text.parse::<u64>().map_err(|e| {
            IdentifierError::InvalidFormat(format!("invalid item id '{}': {}", item_text, e))
        })?;

        Ok(Self {
            text: text.to_owned(),
            item_id,
            namespace,
            partition,
            check_digit: text.as_bytes()[len - 1] - b'0',
        })
    }

    pub fn item_id(&self) -> u64 {
        self.item_id
    }

    /// The 7-digit namespace of a long-form SCTID.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn partition(&self) -> PartitionType {
        self.partition
    }

    pub fn check_digit(&self) -> u8 {
        self.check_digit
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The legacy Type 3 UUID historically assigned to this SCTID.
    pub fn to_uuid(&self) -> Uuid {
        type_three(&self.text)
    }
}

impl fmt::Display for SctId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for SctId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SctId::parse(s)
    }
}

/// Returns `true` if `text` is a well-formed SCTID with a correct check digit.
pub fn is_valid(text: &str) -> bool {
    validate(text).is_ok()
}

/// Generates a long-form SCTID for `item_id` in `namespace`.
///
/// The result is re-validated before it is returned, which rejects item ids too long to fit
/// beside the namespace within 18 digits.
///
/// # Errors
///
/// Returns [`IdentifierError::IllegalArgument`] if `item_id` is zero, `partition` is short
/// form, `namespace` is not exactly seven decimal digits, or the assembled identifier fails
/// validation.
pub fn generate(item_id: u64, namespace: &str, partition: PartitionType) -> IdentifierResult<String> {
    if item_id == 0 {
        return Err(IdentifierError::IllegalArgument(
            "item id must be positive".into(),
        ));
    }
    if !partition.is_long_form() {
        return Err(IdentifierError::IllegalArgument(format!(
            "partition {} is not long form",
            partition
        )));
    }
    if namespace.len() != NAMESPACE_LEN || !namespace.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdentifierError::IllegalArgument(format!(
            "namespace must be {} decimal digits, got: '{}'",
            NAMESPACE_LEN, namespace
        )));
    }

    let payload = format!("{}{}{}", item_id, namespace, partition.digits());
    let sctid = verhoeff::append_check_digit(&payload)?;

    if let Err(e) = validate(&sctid) {
        tracing::warn!(item_id, namespace, %sctid, error = %e, "generated SCTID failed self-check");
        return Err(IdentifierError::IllegalArgument(format!(
            "item id {} does not fit namespace {}: {}",
            item_id, namespace, e
        )));
    }
    Ok(sctid)
}

/// Returns the legacy Type 3 UUID for a valid SCTID.
///
/// # Errors
///
/// Returns [`IdentifierError::InvalidFormat`] if `sctid` is not a valid SCTID.
pub fn snomed_uuid(sctid: &str) -> IdentifierResult<Uuid> {
    validate(sctid)?;
    Ok(type_three(sctid))
}

fn validate(text: &str) -> IdentifierResult<PartitionType> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdentifierError::InvalidFormat(format!(
            "SCTID must be decimal digits, got: '{}'",
            text
        )));
    }
    if text.starts_with('0') {
        return Err(IdentifierError::InvalidFormat(format!(
            "SCTID must not have a leading zero, got: '{}'",
            text
        )));
    }

    let value = text
        .parse::<u64>()
        .map_err(|_| IdentifierError::InvalidFormat(format!("SCTID out of range: '{}'", text)))?;
    if !(MIN_SCTID..=MAX_SCTID).contains(&value) {
        return Err(IdentifierError::InvalidFormat(format!(
            "SCTID out of range: '{}'",
            text
        )));
    }

    let len = text.len();
    let partition = PartitionType::from_digits(&text[len - 3..len - 1])?;
    if partition.is_long_form() && len < MIN_LONG_FORM_LEN {
        return Err(IdentifierError::InvalidFormat(format!(
            "long-form SCTID must be at least {} digits, got: '{}'",
            MIN_LONG_FORM_LEN, text
        )));
    }

    if !verhoeff::verify(text) {
        return Err(IdentifierError::InvalidFormat(format!(
            "SCTID check digit mismatch: '{}'",
            text
        )));
    }

    Ok(partition)
}
