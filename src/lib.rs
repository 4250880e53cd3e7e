//! # Kiln - Tolerant Record Ingestion
//!
//! Walks a paginated, schema-unstable tabular source and turns each row
//! into a fixed-shape canonical record, whatever the source called its
//! columns or however it encoded their values.
//!
//! ## Modules
//!
//! - **normalize**: candidate-key resolution, value coercion and record mapping
//! - **ingest**: paginated collection, page sources and output writers
//! - **input**: raw records from local JSON / NDJSON
//!
//! ## Quick Start
//!
//! ### Mapping a row
//!
//! ```rust
//! use kiln::normalize::{RawRecord, RecordMapper};
//! use serde_json::json;
//!
//! let raw: RawRecord = serde_json::from_value(json!({
//!     "id": "rec1",
//!     "fields": {
//!         "Template ID": "tpl-42",
//!         "TYPE": "Beer Mat",
//!         "fields_json": "[{\"key\":\"name\",\"type\":\"text\"}]",
//!         "requires_photo": "yes"
//!     }
//! })).unwrap();
//!
//! let record = RecordMapper::default().map(&raw);
//! assert_eq!(record.template_id, "tpl-42");
//! assert_eq!(record.machine_type, "beer-mat");
//! assert!(record.requires_photo);
//! assert_eq!(record.fields.len(), 1);
//! ```
//!
//! ### Ingesting a paginated collection
//!
//! ```rust
//! use kiln::ingest::{ingest, Collector, MemorySource};
//! use kiln::normalize::{RawRecord, RecordMapper};
//! use serde_json::Map;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut source = MemorySource::from_record_pages(vec![
//!     vec![RawRecord::new("rec1", Map::new())],
//!     vec![RawRecord::new("rec2", Map::new())],
//! ]);
//!
//! let response = ingest(&mut source, &Collector::default(), &RecordMapper::default())?;
//! assert_eq!(response.records.len(), 2);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::io::Read;

pub mod error;
pub mod ingest;
pub mod input;
pub mod normalize;

// Re-export commonly used types for convenience
pub use error::IngestError;
pub use ingest::{ingest, Collector, CollectorConfig, MemorySource, Page, PageSource, SourceConfig};
pub use normalize::{
    CanonicalRecord, IngestResponse, MapperConfig, OutputOptions, RawRecord, RecordMapper, TypeStyle,
};

/// Map every raw record found in a JSON / NDJSON stream
pub fn map_json<R: Read>(mut reader: R, mapper: &RecordMapper) -> Result<Vec<CanonicalRecord>> {
    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .context("Failed to read input")?;

    let raws = input::parse_raw_records(&content)?;
    Ok(mapper.map_all(&raws))
}
