//! Tolerant normalization of raw source rows into canonical records
//!
//! Column names in the source drift (renamed, re-cased, punctuated
//! differently) and values arrive as JSON strings, parsed structures,
//! attachment arrays or loosely spelled flags. This module resolves each
//! canonical field from a prioritized list of candidate columns and coerces
//! whatever it finds into a fixed type.

pub mod coerce;
pub mod fields;
pub mod mapper;
pub mod resolve;
pub mod types;

pub use fields::{field_table, CoercionKind, FieldDefault, FieldSpec, FieldValue};
pub use mapper::RecordMapper;
pub use resolve::{normalize_key, resolve};
pub use types::{
    CanonicalRecord, IngestResponse, MapperConfig, OutputOptions, RawRecord, SlugInfo, TypeMeta,
    TypeStyle,
};
