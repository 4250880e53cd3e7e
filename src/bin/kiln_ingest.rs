//! kiln-ingest: Collect a paginated template table and print canonical records
//!
//! Usage:
//!   # Walk the live table (credentials from flags or environment)
//!   AIRTABLE_BASE=app123 AIRTABLE_API_KEY=pat... kiln-ingest
//!
//!   # Replay saved pages instead of calling the API
//!   kiln-ingest --pages pages.json --slug --type raw
//!
//!   # Only rows for one template, ids rewritten as slugs
//!   kiln-ingest --template-id tpl-42 --slugify-id --compact

use anyhow::Result;
use clap::Parser;
use kiln::ingest::{
    demo_response, ingest, AirtableSource, Collector, CollectorConfig, MemorySource, OutputFormat,
    PageSource, ResponseWriter, SourceConfig,
};
use kiln::normalize::{MapperConfig, OutputOptions, RecordMapper, TypeStyle};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "kiln-ingest")]
#[command(about = "Collect a paginated template table into canonical records", long_about = None)]
struct Args {
    /// Read pages from a JSON file instead of the API
    #[arg(long, value_name = "FILE")]
    pages: Option<String>,

    #[arg(long, env = "AIRTABLE_BASE", hide_env_values = true)]
    base: Option<String>,

    #[arg(long, env = "AIRTABLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "AIRTABLE_TABLE", default_value = kiln::ingest::config::DEFAULT_TABLE)]
    table: String,

    #[arg(long, env = "AIRTABLE_VIEW", default_value = kiln::ingest::config::DEFAULT_VIEW)]
    view: String,

    /// Request the table without a view
    #[arg(long)]
    no_view: bool,

    #[arg(long, default_value = kiln::ingest::config::DEFAULT_API_BASE)]
    api_base: String,

    /// Only collect rows whose template_id equals this value
    #[arg(long)]
    template_id: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Stop with an error after this many pages
    #[arg(long)]
    max_pages: Option<usize>,

    /// Attach a `slug: { type }` object to every record
    #[arg(long)]
    slug: bool,

    /// Machine type casing: kebab or raw
    #[arg(long = "type", default_value = "kebab")]
    type_style: String,

    /// Rewrite template ids as prefixed kebab slugs
    #[arg(long)]
    slugify_id: bool,

    /// Default for requires_photo when the table has no such column
    #[arg(long)]
    requires_photo_default: Option<bool>,

    /// Default for requires_text when the table has no such column
    #[arg(long)]
    requires_text_default: Option<bool>,

    /// Compact output (no pretty-printing)
    #[arg(long)]
    compact: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mapper = RecordMapper::new(output_options(&args), mapper_config(&args));
    let collector = Collector::new(CollectorConfig {
        max_pages: args.max_pages,
    });

    let format = if args.compact {
        OutputFormat::Compact
    } else {
        OutputFormat::Pretty
    };
    let mut writer = ResponseWriter::new(std::io::stdout().lock(), format);

    let mut source: Box<dyn PageSource> = if let Some(path) = &args.pages {
        info!(path = %path, "Replaying pages from file");
        Box::new(MemorySource::from_file(path)?)
    } else if let Some(config) = source_config(&args) {
        info!(base = %config.base_id, table = %config.table, "Collecting from API");
        match AirtableSource::new(config) {
            Ok(source) => Box::new(source),
            Err(err) => return fail(&mut writer, err),
        }
    } else {
        info!("No source configured, returning demo record");
        writer.write_records(demo_response().records)?;
        return writer.flush();
    };

    match ingest(source.as_mut(), &collector, &mapper) {
        Ok(response) => {
            writer.write_records(response.records)?;
            writer.flush()
        }
        Err(err) => fail(&mut writer, err),
    }
}

fn fail<W: std::io::Write>(writer: &mut ResponseWriter<W>, err: kiln::IngestError) -> Result<()> {
    tracing::error!(error = %err, status = err.status(), "Ingestion failed");
    writer.write_error(&err)?;
    writer.flush()?;
    std::process::exit(2);
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn output_options(args: &Args) -> OutputOptions {
    OutputOptions {
        want_slug: args.slug,
        type_style: TypeStyle::parse(&args.type_style),
        slugify_id: args.slugify_id,
    }
}

fn mapper_config(args: &Args) -> MapperConfig {
    let mut config = MapperConfig::default();
    if let Some(photo) = args.requires_photo_default {
        config.requires_photo_default = photo;
    }
    if let Some(text) = args.requires_text_default {
        config.requires_text_default = text;
    }
    config
}

fn source_config(args: &Args) -> Option<SourceConfig> {
    let base = args.base.as_deref().filter(|b| !b.trim().is_empty())?;
    let key = args.api_key.as_deref().filter(|k| !k.trim().is_empty())?;

    let mut config = SourceConfig::new(base, key);
    config.api_base = args.api_base.clone();
    config.table = args.table.clone();
    config.view = (!args.no_view).then(|| args.view.clone());
    config.template_id = args.template_id.clone();
    config.timeout = Duration::from_secs(args.timeout);
    Some(config)
}
