//! Paginated collection and the end-to-end ingestion call
//!
//! An ingestion call walks the source to completion and maps every row.
//! It either returns the complete canonical batch or fails as a whole;
//! only page-level failures can fail it.

pub mod airtable;
pub mod collector;
pub mod config;
pub mod source;
pub mod writer;

pub use airtable::AirtableSource;
pub use collector::{Collector, CollectorConfig};
pub use config::SourceConfig;
pub use source::{MemorySource, Page, PageSource, Reply};
pub use writer::{OutputFormat, ResponseWriter};

use crate::error::Result;
use crate::normalize::{CanonicalRecord, IngestResponse, RecordMapper, TypeMeta};
use serde_json::{json, Value};

/// Collect every page from `source` and map the rows in order
pub fn ingest<S: PageSource + ?Sized>(
    source: &mut S,
    collector: &Collector,
    mapper: &RecordMapper,
) -> Result<IngestResponse> {
    let raws = collector.collect(source)?;
    let records = mapper.map_all(&raws);
    Ok(IngestResponse { records })
}

/// A placeholder batch for when no source is configured, so a consumer's
/// template list still renders
pub fn demo_response() -> IngestResponse {
    let layout = match json!({"canvasMM": [100, 100], "elements": []}) {
        Value::Object(obj) => Some(obj),
        _ => None,
    };

    IngestResponse {
        records: vec![CanonicalRecord {
            template_id: "tpl-demo-1".to_string(),
            name: "Demo Template".to_string(),
            type_label: String::new(),
            machine_type: String::new(),
            fields: Vec::new(),
            layout,
            requires_photo: true,
            requires_text: true,
            optional: false,
            optional_photo: false,
            optional_text: false,
            base_image: None,
            type_meta: TypeMeta::default(),
            slug: None,
        }],
    }
}
