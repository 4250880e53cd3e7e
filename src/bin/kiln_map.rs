//! kiln-map: Normalize raw template rows offline
//!
//! Usage:
//!   # Map an exported page (or array of rows) to a response document
//!   kiln-map export.json
//!
//!   # Stream NDJSON rows from stdin, one canonical record per line
//!   cat rows.jsonl | kiln-map --ndjson
//!
//!   # Raw machine types with slug objects
//!   kiln-map --type raw --slug export.json

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use kiln::ingest::{OutputFormat, ResponseWriter};
use kiln::normalize::{MapperConfig, OutputOptions, RecordMapper, TypeStyle};
use std::fs::File;
use std::io::{BufReader, Read};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kiln-map")]
#[command(about = "Normalize raw template rows into canonical records", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Write one canonical record per line instead of a response document
    #[arg(long)]
    ndjson: bool,

    /// Compact output (no pretty-printing)
    #[arg(long, conflicts_with = "ndjson")]
    compact: bool,

    /// Attach a `slug: { type }` object to every record
    #[arg(long)]
    slug: bool,

    /// Machine type casing: kebab or raw
    #[arg(long = "type", default_value = "kebab")]
    type_style: String,

    /// Rewrite template ids as prefixed kebab slugs
    #[arg(long)]
    slugify_id: bool,

    /// Prefix for slugified template ids (default: "tpl-")
    #[arg(long)]
    id_prefix: Option<String>,

    /// Default for requires_photo when a row has no such column (default: true)
    #[arg(long)]
    requires_photo_default: Option<bool>,

    /// Default for requires_text when a row has no such column (default: true)
    #[arg(long)]
    requires_text_default: Option<bool>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Build config
    let mut config = MapperConfig::default();
    if let Some(prefix) = args.id_prefix {
        config.id_prefix = prefix;
    }
    if let Some(photo) = args.requires_photo_default {
        config.requires_photo_default = photo;
    }
    if let Some(text) = args.requires_text_default {
        config.requires_text_default = text;
    }

    let options = OutputOptions {
        want_slug: args.slug,
        type_style: TypeStyle::parse(&args.type_style),
        slugify_id: args.slugify_id,
    };

    let reader: Box<dyn Read> = if let Some(file_path) = &args.input {
        Box::new(BufReader::new(
            File::open(file_path).with_context(|| format!("Failed to open {}", file_path))?,
        ))
    } else {
        Box::new(std::io::stdin())
    };

    let mapper = RecordMapper::new(options, config);
    let records = kiln::map_json(reader, &mapper)?;

    if records.is_empty() {
        tracing::warn!("No records found in input");
    }

    let format = if args.ndjson {
        OutputFormat::Ndjson
    } else if args.compact {
        OutputFormat::Compact
    } else {
        OutputFormat::Pretty
    };

    let mut writer = ResponseWriter::new(std::io::stdout().lock(), format);
    writer.write_records(records)?;
    writer.flush()
}
