use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row as delivered by the source: an id plus arbitrary columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,

    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        RawRecord {
            id: id.into(),
            fields,
        }
    }
}

/// The fixed-shape record handed to consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub template_id: String,

    pub name: String,

    /// Human type label, original case
    #[serde(rename = "TYPE")]
    pub type_label: String,

    /// Machine type slug
    #[serde(rename = "type")]
    pub machine_type: String,

    /// Field definitions for the downstream renderer, opaque here
    pub fields: Vec<Value>,

    pub layout: Option<Map<String, Value>>,

    pub requires_photo: bool,
    pub requires_text: bool,
    pub optional: bool,
    pub optional_photo: bool,
    pub optional_text: bool,

    pub base_image: Option<String>,

    #[serde(rename = "typeMeta")]
    pub type_meta: TypeMeta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<SlugInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeMeta {
    pub title: Option<String>,
    pub instructions_md: String,
    pub requirements: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlugInfo {
    #[serde(rename = "type")]
    pub machine_type: String,
}

/// The batch returned by one ingestion call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub records: Vec<CanonicalRecord>,
}

/// Casing of the machine `type` slug
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeStyle {
    #[default]
    Kebab,
    Raw,
}

impl TypeStyle {
    /// Unrecognized values fall back to kebab
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("raw") {
            TypeStyle::Raw
        } else {
            TypeStyle::Kebab
        }
    }
}

/// Caller-selected output variants
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Attach a `slug: { type }` object to every record
    pub want_slug: bool,

    pub type_style: TypeStyle,

    /// Rewrite `template_id` as a prefixed kebab slug
    pub slugify_id: bool,
}

impl OutputOptions {
    /// Build options from query-string style pairs.
    ///
    /// Recognizes `slug`, `type` and `slugify_id` (alias `id`); anything else
    /// is ignored. Flag values are read the same way source flags are.
    pub fn from_query<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = OutputOptions::default();
        for (key, value) in pairs {
            let flag = crate::normalize::coerce::to_bool(Some(&Value::String(value.to_string())));
            match key {
                "slug" => options.want_slug = flag,
                "type" => options.type_style = TypeStyle::parse(value),
                "slugify_id" | "id" => options.slugify_id = flag,
                _ => {}
            }
        }
        options
    }
}

/// Mapper-wide defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperConfig {
    /// Value of `requires_photo` when no column supplies it
    pub requires_photo_default: bool,

    /// Value of `requires_text` when no column supplies it
    pub requires_text_default: bool,

    /// Prefix for slugified template ids
    pub id_prefix: String,
}

impl Default for MapperConfig {
    fn default() -> Self {
        MapperConfig {
            requires_photo_default: true,
            requires_text_default: true,
            id_prefix: String::from("tpl-"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_record_without_fields() {
        let raw: RawRecord = serde_json::from_value(json!({"id": "rec1"})).unwrap();
        assert_eq!(raw.id, "rec1");
        assert!(raw.fields.is_empty());
    }

    #[test]
    fn test_output_options_from_query() {
        let options = OutputOptions::from_query([("slug", "1"), ("type", "raw"), ("other", "x")]);
        assert!(options.want_slug);
        assert_eq!(options.type_style, TypeStyle::Raw);
        assert!(!options.slugify_id);

        let options = OutputOptions::from_query([("type", "SHOUTING"), ("id", "yes")]);
        assert_eq!(options.type_style, TypeStyle::Kebab);
        assert!(options.slugify_id);
    }

    #[test]
    fn test_slug_omitted_unless_present() {
        let record = CanonicalRecord {
            template_id: "tpl-1".to_string(),
            name: String::new(),
            type_label: "Beer Mat".to_string(),
            machine_type: "beer-mat".to_string(),
            fields: vec![],
            layout: None,
            requires_photo: true,
            requires_text: true,
            optional: false,
            optional_photo: false,
            optional_text: false,
            base_image: None,
            type_meta: TypeMeta::default(),
            slug: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("slug").is_none());
        assert_eq!(value["TYPE"], "Beer Mat");
        assert_eq!(value["type"], "beer-mat");
        assert_eq!(value["typeMeta"], json!({"title": null, "instructions_md": "", "requirements": []}));
        assert_eq!(value["layout"], Value::Null);

        let with_slug = CanonicalRecord {
            slug: Some(SlugInfo { machine_type: "beer-mat".to_string() }),
            ..record
        };
        let value = serde_json::to_value(&with_slug).unwrap();
        assert_eq!(value["slug"], json!({"type": "beer-mat"}));
    }
}
