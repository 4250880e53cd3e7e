use crate::error::IngestError;
use crate::normalize::{CanonicalRecord, IngestResponse};
use anyhow::{Context, Result};
use serde_json::json;
use std::io::Write;

/// Output framing for canonical records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One `{ "records": [...] }` document, indented
    Pretty,
    /// One `{ "records": [...] }` document on a single line
    Compact,
    /// One record per line, no envelope
    Ndjson,
}

/// Writes ingestion results (or an ingestion failure) to any sink
pub struct ResponseWriter<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> ResponseWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        ResponseWriter { writer, format }
    }

    pub fn write_records(&mut self, records: Vec<CanonicalRecord>) -> Result<()> {
        match self.format {
            OutputFormat::Ndjson => {
                for record in &records {
                    let line = serde_json::to_string(record).context("Failed to serialize record")?;
                    writeln!(self.writer, "{}", line).context("Failed to write record")?;
                }
            }
            OutputFormat::Pretty | OutputFormat::Compact => {
                let response = IngestResponse { records };
                let doc = if self.format == OutputFormat::Pretty {
                    serde_json::to_string_pretty(&response)
                } else {
                    serde_json::to_string(&response)
                }
                .context("Failed to serialize response")?;
                writeln!(self.writer, "{}", doc).context("Failed to write response")?;
            }
        }
        Ok(())
    }

    /// `{ "error": ..., "status": ..., "details": ... }`, the shape consumers
    /// see instead of `records` when the call fails
    pub fn write_error(&mut self, err: &IngestError) -> Result<()> {
        let body = json!({
            "error": err.to_string(),
            "status": err.status(),
            "details": err.details(),
        });
        writeln!(self.writer, "{}", body).context("Failed to write error")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }
}
