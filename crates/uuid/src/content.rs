//! Seed text for content-derived UUIDs.
//!
//! Each kind of terminology content has exactly one seed layout. The layout is part of the
//! identity contract: two importers that build the same description on different machines must
//! produce the same seed text, or the platform will hold two copies of one description.
//!
//! Layout rules, shared by every kind:
//! - Fields appear in the fixed order documented on each [`ContentSeed`] variant.
//! - Fields are joined with `|`.
//! - An absent field is skipped together with its separator.
//! - At least one field must be non-empty.
//!
//! Canonical text for typed values:
//! - UUIDs: hyphenated lower-case (`Uuid`'s `Display`).
//! - Integers: base 10, leading `-` when negative.
//! - Arbitrary bytes: lower-case SHA-1 hex.

use crate::namespace::type_five;
use crate::{UuidError, UuidResult};
use solor_digest::{digest, DigestAlgorithm};
use uuid::Uuid;

/// Separator between seed fields.
const FIELD_SEPARATOR: &str = "|";

/// Final field of a membership seed; membership semantics carry no data of their own.
const MEMBERSHIP_SENTINEL: &str = "member";

/// Seed text for a dynamic-data column with no value.
const NULL_COLUMN: &str = "null";

/// Declared data type of a dynamic-data column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DynamicDataType {
    Nid,
    Long,
    String,
    Integer,
    Float,
    Double,
    Boolean,
    ByteArray,
    Array,
    Uuid,
    Polymorphic,
    Unknown,
}

impl DynamicDataType {
    /// Display name used in dynamic-data seeds.
    pub fn display_name(&self) -> &'static str {
        match self {
            DynamicDataType::Nid => "Component Nid",
            DynamicDataType::Long => "Long",
            DynamicDataType::String => "String",
            DynamicDataType::Integer => "Integer",
            DynamicDataType::Float => "Float",
            DynamicDataType::Double => "Double",
            DynamicDataType::Boolean => "Boolean",
            DynamicDataType::ByteArray => "Arbitrary Data",
            DynamicDataType::Array => "Array",
            DynamicDataType::Uuid => "UUID",
            DynamicDataType::Polymorphic => "Unspecified",
            DynamicDataType::Unknown => "Unknown",
        }
    }
}

/// One populated column of a dynamic-data semantic.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum DynamicColumn {
    /// A reference to another component, seeded by that component's UUID.
    Nid(Uuid),
    /// Any other value, seeded by the SHA-1 of its serialized bytes.
    Data {
        data_type: DynamicDataType,
        bytes: Vec<u8>,
    },
}

impl DynamicColumn {
    pub fn data_type(&self) -> DynamicDataType {
        match self {
            DynamicColumn::Nid(_) => DynamicDataType::Nid,
            DynamicColumn::Data { data_type, .. } => *data_type,
        }
    }

    fn seed_text(&self) -> String {
        let value = match self {
            DynamicColumn::Nid(component) => component.to_string(),
            DynamicColumn::Data { bytes, .. } => digest(DigestAlgorithm::Sha1, bytes).to_hex(),
        };
        format!("{}{}", self.data_type().display_name(), value)
    }
}

/// The content a UUID is derived from, one variant per kind of content.
///
/// Build the variant, then call [`ContentSeed::to_uuid`]. [`ContentSeed::seed_text`] exposes
/// the exact text that is hashed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "snake_case")
)]
pub enum ContentSeed {
    /// Fields: concept, case significance, description type, language, text.
    Description {
        concept: Option<Uuid>,
        case_significance: Option<Uuid>,
        description_type: Option<Uuid>,
        language: Option<Uuid>,
        text: Option<String>,
    },
    /// Fields: assemblage, referenced component, `member`.
    Membership {
        assemblage: Uuid,
        referenced_component: Uuid,
    },
    /// Fields: assemblage, referenced component, column count, then one field per column.
    DynamicData {
        assemblage: Uuid,
        referenced_component: Uuid,
        columns: Vec<Option<DynamicColumn>>,
    },
    /// Fields: assemblage, referenced component, component.
    ComponentReference {
        assemblage: Uuid,
        referenced_component: Uuid,
        component: Uuid,
    },
    /// Fields: assemblage, referenced component, value.
    StringValue {
        assemblage: Uuid,
        referenced_component: Uuid,
        value: String,
    },
    /// Fields: assemblage, referenced component, value.
    LongValue {
        assemblage: Uuid,
        referenced_component: Uuid,
        value: i64,
    },
    /// Fields: assemblage, referenced component, component, value.
    NidInt {
        assemblage: Uuid,
        referenced_component: Uuid,
        component: Uuid,
        value: i32,
    },
    /// Fields: assemblage, referenced component, component, value.
    NidLong {
        assemblage: Uuid,
        referenced_component: Uuid,
        component: Uuid,
        value: i64,
    },
    /// Fields: assemblage, referenced component, rendered graph bytes.
    LogicGraph {
        assemblage: Uuid,
        referenced_component: Uuid,
        graph: Vec<Vec<u8>>,
    },
}

impl ContentSeed {
    /// Short name of the content kind, used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentSeed::Description { .. } => "description",
            ContentSeed::Membership { .. } => "membership",
            ContentSeed::DynamicData { .. } => "dynamic data",
            ContentSeed::ComponentReference { .. } => "component reference",
            ContentSeed::StringValue { .. } => "string",
            ContentSeed::LongValue { .. } => "long",
            ContentSeed::NidInt { .. } => "nid int",
            ContentSeed::NidLong { .. } => "nid long",
            ContentSeed::LogicGraph { .. } => "logic graph",
        }
    }

    /// The exact text hashed for this content.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::EmptyInput`] if every field is absent or empty.
    pub fn seed_text(&self) -> UuidResult<String> {
        join_fields(self.kind(), &self.fields())
    }

    /// Derives the Type 5 UUID for this content within `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::EmptyInput`] if every field is absent or empty.
    pub fn to_uuid(&self, namespace: Option<&Uuid>) -> UuidResult<Uuid> {
        let seed = self.seed_text()?;
        let uuid = type_five(namespace, &seed);
        tracing::debug!(kind = self.kind(), %seed, %uuid, "content uuid");
        Ok(uuid)
    }

    fn fields(&self) -> Vec<Option<String>> {
        match self {
            ContentSeed::Description {
                concept,
                case_significance,
                description_type,
                language,
                text,
            } => vec![
                concept.map(|u| u.to_string()),
                case_significance.map(|u| u.to_string()),
                description_type.map(|u| u.to_string()),
                language.map(|u| u.to_string()),
                text.clone(),
            ],
            ContentSeed::Membership {
                assemblage,
                referenced_component,
            } => vec![
                Some(assemblage.to_string()),
                Some(referenced_component.to_string()),
                Some(MEMBERSHIP_SENTINEL.to_owned()),
            ],
            ContentSeed::DynamicData {
                assemblage,
                referenced_component,
                columns,
            } => {
                let mut fields = vec![
                    Some(assemblage.to_string()),
                    Some(referenced_component.to_string()),
                    Some(columns.len().to_string()),
                ];
                fields.extend(columns.iter().map(|column| {
                    Some(
                        column
                            .as_ref()
                            .map_or_else(|| NULL_COLUMN.to_owned(), DynamicColumn::seed_text),
                    )
                }));
                fields
            }
            ContentSeed::ComponentReference {
                assemblage,
                referenced_component,
                component,
            } => vec![
                Some(assemblage.to_string()),
                Some(referenced_component.to_string()),
                Some(component.to_string()),
            ],
            ContentSeed::StringValue {
                assemblage,
                referenced_component,
                value,
            } => vec![
                Some(assemblage.to_string()),
                Some(referenced_component.to_string()),
                Some(value.clone()),
            ],
            ContentSeed::LongValue {
                assemblage,
                referenced_component,
                value,
            } => vec![
                Some(assemblage.to_string()),
                Some(referenced_component.to_string()),
                Some(value.to_string()),
            ],
            ContentSeed::NidInt {
                assemblage,
                referenced_component,
                component,
                value,
            } => vec![
                Some(assemblage.to_string()),
                Some(referenced_component.to_string()),
                Some(component.to_string()),
                Some(value.to_string()),
            ],
            ContentSeed::NidLong {
                assemblage,
                referenced_component,
                component,
                value,
            } => vec![
                Some(assemblage.to_string()),
                Some(referenced_component.to_string()),
                Some(component.to_string()),
                Some(value.to_string()),
            ],
            ContentSeed::LogicGraph {
                assemblage,
                referenced_component,
                graph,
            } => vec![
                Some(assemblage.to_string()),
                Some(referenced_component.to_string()),
                Some(render_byte_arrays(graph)),
            ],
        }
    }
}

fn join_fields(kind: &'static str, fields: &[Option<String>]) -> UuidResult<String> {
    if !fields.iter().flatten().any(|field| !field.is_empty()) {
        return Err(UuidError::EmptyInput(kind));
    }
    Ok(fields
        .iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR))
}

/// Renders `[[1, -2], [3]]`: bytes as signed decimals, `", "` between elements.
fn render_byte_arrays(arrays: &[Vec<u8>]) -> String {
    let rendered: Vec<String> = arrays
        .iter()
        .map(|array| {
            let values: Vec<String> = array.iter().map(|b| (*b as i8).to_string()).collect();
            format!("[{}]", values.join(", "))
        })
        .collect();
    format!("[{}]", rendered.join(", "))
}
