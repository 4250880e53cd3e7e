use thiserror::Error;

/// Failures that abort an ingestion call.
///
/// Per-field anomalies (malformed JSON columns, unresolved fields) never
/// appear here; the mapper absorbs them into the field's fallback value.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The source answered a page request with a non-success status
    #[error("Upstream {status}")]
    Upstream { status: u16, body: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body was not a page
    #[error("Decode error: {0}")]
    Decode(String),

    /// The source handed back a cursor already followed in this walk
    #[error("Continuation token repeated: {0}")]
    CursorLoop(String),

    #[error("Page limit of {0} exceeded")]
    PageLimit(usize),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IngestError {
    /// Upstream status for error responses; transport-side failures map to 502
    pub fn status(&self) -> u16 {
        match self {
            IngestError::Upstream { status, .. } => *status,
            IngestError::Config(_) => 500,
            _ => 502,
        }
    }

    /// Raw upstream body, or the error text for non-upstream failures
    pub fn details(&self) -> String {
        match self {
            IngestError::Upstream { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
