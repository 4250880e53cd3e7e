//! The canonical field table
//!
//! Each canonical field is described once: where to look for it in a raw
//! record, how to coerce what is found, and what to use when nothing is.

use crate::normalize::coerce::{first_attachment_url, to_array, to_bool, to_object, to_text};
use crate::normalize::types::MapperConfig;
use serde_json::{Map, Value};

/// How a resolved raw value becomes a typed canonical value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionKind {
    RawString,
    TrimmedString,
    Boolean,
    JsonArray,
    JsonObject,
    UrlOrFirstAttachmentUrl,
}

/// Value used when no candidate key resolves
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDefault {
    Text(&'static str),
    Flag(bool),
    Null,
    EmptyArray,
}

/// A typed canonical value, before it is placed in the record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Flag(bool),
    Array(Vec<Value>),
    Object(Option<Map<String, Value>>),
}

impl FieldValue {
    pub fn into_text(self) -> Option<String> {
        match self {
            FieldValue::Text(t) => t,
            _ => None,
        }
    }

    pub fn into_flag(self) -> bool {
        matches!(self, FieldValue::Flag(true))
    }

    pub fn into_array(self) -> Vec<Value> {
        match self {
            FieldValue::Array(items) => items,
            _ => Vec::new(),
        }
    }

    pub fn into_object(self) -> Option<Map<String, Value>> {
        match self {
            FieldValue::Object(obj) => obj,
            _ => None,
        }
    }
}

/// Resolution and coercion rule for one canonical field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub canonical_name: &'static str,

    /// Highest priority first
    pub candidate_keys: &'static [&'static str],

    pub coercion: CoercionKind,

    pub default: FieldDefault,
}

impl FieldSpec {
    const fn new(
        canonical_name: &'static str,
        candidate_keys: &'static [&'static str],
        coercion: CoercionKind,
        default: FieldDefault,
    ) -> Self {
        FieldSpec {
            canonical_name,
            candidate_keys,
            coercion,
            default,
        }
    }

    /// Coerce a resolved value, or produce the default for an unresolved one.
    ///
    /// An explicit `null` carries no value of any kind and takes the default
    /// as well; this keeps a `null` flag from reading as `false` where the
    /// field defaults to `true`.
    pub fn coerce(&self, resolved: Option<&Value>) -> FieldValue {
        let value = match resolved {
            None | Some(Value::Null) => return self.default_value(),
            Some(v) => Some(v),
        };

        match self.coercion {
            CoercionKind::RawString => FieldValue::Text(to_text(value, false)),
            CoercionKind::TrimmedString => FieldValue::Text(to_text(value, true)),
            CoercionKind::Boolean => FieldValue::Flag(to_bool(value)),
            CoercionKind::JsonArray => FieldValue::Array(to_array(value)),
            CoercionKind::JsonObject => FieldValue::Object(to_object(value)),
            CoercionKind::UrlOrFirstAttachmentUrl => FieldValue::Text(first_attachment_url(value)),
        }
    }

    pub fn default_value(&self) -> FieldValue {
        match &self.default {
            FieldDefault::Text(s) => FieldValue::Text(Some(s.to_string())),
            FieldDefault::Flag(b) => FieldValue::Flag(*b),
            FieldDefault::EmptyArray => FieldValue::Array(Vec::new()),
            FieldDefault::Null => match self.coercion {
                CoercionKind::JsonObject => FieldValue::Object(None),
                CoercionKind::JsonArray => FieldValue::Array(Vec::new()),
                CoercionKind::Boolean => FieldValue::Flag(false),
                _ => FieldValue::Text(None),
            },
        }
    }
}

pub const TEMPLATE_ID: &str = "template_id";
pub const NAME: &str = "name";
pub const TYPE_LABEL: &str = "TYPE";
pub const MACHINE_TYPE: &str = "type";
pub const FIELDS: &str = "fields";
pub const LAYOUT: &str = "layout";
pub const REQUIRES_PHOTO: &str = "requires_photo";
pub const REQUIRES_TEXT: &str = "requires_text";
pub const OPTIONAL: &str = "optional";
pub const OPTIONAL_PHOTO: &str = "optional_photo";
pub const OPTIONAL_TEXT: &str = "optional_text";
pub const BASE_IMAGE: &str = "base_image";
pub const META_TITLE: &str = "typeMeta.title";
pub const META_INSTRUCTIONS: &str = "typeMeta.instructions_md";
pub const META_REQUIREMENTS: &str = "typeMeta.requirements";

use CoercionKind::*;

static BASE_TABLE: [FieldSpec; 15] = [
    // template_id falls back to the record id, which the mapper supplies
    FieldSpec::new(TEMPLATE_ID, &["template_id", "Template_id", "Template ID", "slug", "id"], TrimmedString, FieldDefault::Null),
    FieldSpec::new(NAME, &["name", "Name", "template_name", "Template Name"], RawString, FieldDefault::Text("")),
    FieldSpec::new(TYPE_LABEL, &["TYPE", "Type", "type_label"], TrimmedString, FieldDefault::Text("")),
    // Explicit machine type column; derived from TYPE when absent
    FieldSpec::new(MACHINE_TYPE, &["type_slug", "type_key", "machine_type"], TrimmedString, FieldDefault::Null),
    FieldSpec::new(FIELDS, &["fields_json", "Fields JSON", "fields"], JsonArray, FieldDefault::EmptyArray),
    FieldSpec::new(LAYOUT, &["layout_spec", "Layout Spec", "layout_json", "layout"], JsonObject, FieldDefault::Null),
    FieldSpec::new(REQUIRES_PHOTO, &["requires_photo", "Requires Photo"], Boolean, FieldDefault::Flag(true)),
    FieldSpec::new(REQUIRES_TEXT, &["requires_text", "Requires Text"], Boolean, FieldDefault::Flag(true)),
    FieldSpec::new(OPTIONAL, &["optional", "Optional"], Boolean, FieldDefault::Flag(false)),
    FieldSpec::new(OPTIONAL_PHOTO, &["optional_photo", "Optional Photo"], Boolean, FieldDefault::Flag(false)),
    FieldSpec::new(OPTIONAL_TEXT, &["optional_text", "Optional Text"], Boolean, FieldDefault::Flag(false)),
    FieldSpec::new(BASE_IMAGE, &["base_image", "Base Image", "base_image_url"], UrlOrFirstAttachmentUrl, FieldDefault::Null),
    FieldSpec::new(META_TITLE, &["type_title", "Type Title", "title"], TrimmedString, FieldDefault::Null),
    FieldSpec::new(META_INSTRUCTIONS, &["instructions_md", "Instructions", "type_instructions_md"], RawString, FieldDefault::Text("")),
    FieldSpec::new(META_REQUIREMENTS, &["requirements_json", "requirements", "type_requirements"], JsonArray, FieldDefault::EmptyArray),
];

/// The field table with the configured `requires_*` defaults applied
pub fn field_table(config: &MapperConfig) -> Vec<FieldSpec> {
    BASE_TABLE
        .iter()
        .cloned()
        .map(|mut spec| {
            match spec.canonical_name {
                REQUIRES_PHOTO => spec.default = FieldDefault::Flag(config.requires_photo_default),
                REQUIRES_TEXT => spec.default = FieldDefault::Flag(config.requires_text_default),
                _ => {}
            }
            spec
        })
        .collect()
}
