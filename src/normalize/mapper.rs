use crate::normalize::coerce::to_kebab;
use crate::normalize::fields::{self, field_table, FieldSpec, FieldValue};
use crate::normalize::resolve::resolve;
use crate::normalize::types::{
    CanonicalRecord, MapperConfig, OutputOptions, RawRecord, SlugInfo, TypeMeta, TypeStyle,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Maps raw source rows onto [`CanonicalRecord`]s.
///
/// Mapping cannot fail: every field falls back to its default on its own,
/// so a row that resolves nothing still yields a valid record.
pub struct RecordMapper {
    table: Vec<FieldSpec>,
    options: OutputOptions,
    config: MapperConfig,
}

impl RecordMapper {
    pub fn new(options: OutputOptions, config: MapperConfig) -> Self {
        RecordMapper {
            table: field_table(&config),
            options,
            config,
        }
    }

    /// Map a batch, preserving order
    pub fn map_all(&self, raws: &[RawRecord]) -> Vec<CanonicalRecord> {
        raws.iter().map(|raw| self.map(raw)).collect()
    }

    /// Map a single raw record
    pub fn map(&self, raw: &RawRecord) -> CanonicalRecord {
        let mut values = self.resolve_all(raw);
        let mut take = |name: &str| values.remove(name).unwrap_or(FieldValue::Text(None));

        let template_id = self.template_id(take(fields::TEMPLATE_ID).into_text(), &raw.id);
        let name = take(fields::NAME).into_text().unwrap_or_default();
        let type_label = take(fields::TYPE_LABEL).into_text().unwrap_or_default();
        let machine_type = self.machine_type(take(fields::MACHINE_TYPE).into_text(), &type_label);

        let record_fields = take(fields::FIELDS).into_array();
        let layout = take(fields::LAYOUT).into_object().map(denest_layout);

        let requires_photo = take(fields::REQUIRES_PHOTO).into_flag();
        let requires_text = take(fields::REQUIRES_TEXT).into_flag();
        let optional = take(fields::OPTIONAL).into_flag();
        let optional_photo = take(fields::OPTIONAL_PHOTO).into_flag();
        let optional_text = take(fields::OPTIONAL_TEXT).into_flag();

        let base_image = take(fields::BASE_IMAGE).into_text();

        let type_meta = TypeMeta {
            title: take(fields::META_TITLE).into_text().filter(|t| !t.is_empty()),
            instructions_md: take(fields::META_INSTRUCTIONS).into_text().unwrap_or_default(),
            requirements: take(fields::META_REQUIREMENTS).into_array(),
        };

        let slug = self.options.want_slug.then(|| SlugInfo {
            machine_type: machine_type.clone(),
        });

        CanonicalRecord {
            template_id,
            name,
            type_label,
            machine_type,
            fields: record_fields,
            layout,
            requires_photo,
            requires_text,
            optional,
            optional_photo,
            optional_text,
            base_image,
            type_meta,
            slug,
        }
    }

    /// Resolve and coerce every field in the table
    fn resolve_all(&self, raw: &RawRecord) -> HashMap<&'static str, FieldValue> {
        self.table
            .iter()
            .map(|spec| {
                let resolved = resolve(&raw.fields, spec.candidate_keys);
                if resolved.is_none() {
                    tracing::trace!(
                        record = %raw.id,
                        field = spec.canonical_name,
                        "No candidate column, using default"
                    );
                }
                (spec.canonical_name, spec.coerce(resolved))
            })
            .collect()
    }

    fn template_id(&self, resolved: Option<String>, record_id: &str) -> String {
        let id = resolved
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| record_id.to_string());

        if !self.options.slugify_id {
            return id;
        }

        let slug = to_kebab(&id);
        let slug = if slug.is_empty() { to_kebab(record_id) } else { slug };
        if slug.is_empty() {
            return id;
        }

        // Slugs are lower-case, so the prefix is compared lower-cased too
        let prefix = &self.config.id_prefix;
        if slug.starts_with(prefix.to_lowercase().as_str()) {
            slug
        } else {
            format!("{}{}", prefix, slug)
        }
    }

    fn machine_type(&self, explicit: Option<String>, type_label: &str) -> String {
        let source = explicit
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| type_label.to_string());

        match self.options.type_style {
            TypeStyle::Kebab => to_kebab(&source),
            TypeStyle::Raw => source,
        }
    }
}

impl Default for RecordMapper {
    fn default() -> Self {
        RecordMapper::new(OutputOptions::default(), MapperConfig::default())
    }
}

/// Hoist `{ "layout": { "elements": [...] } }` when the outer object has no
/// `elements` array of its own.
fn denest_layout(outer: Map<String, Value>) -> Map<String, Value> {
    if matches!(outer.get("elements"), Some(Value::Array(_))) {
        return outer;
    }
    match outer.get("layout") {
        Some(Value::Object(inner)) if matches!(inner.get("elements"), Some(Value::Array(_))) => {
            inner.clone()
        }
        _ => outer,
    }
}
