//! Blocking HTTP page source for an Airtable-style REST collection
//!
//! Requests full records: no `fields[]` projection is sent, since naming a
//! column the live table does not have gets the whole request rejected.

use crate::error::{IngestError, Result};
use crate::ingest::config::SourceConfig;
use crate::ingest::source::{Page, PageSource};
use reqwest::Url;

const USER_AGENT: &str = concat!("kiln/", env!("CARGO_PKG_VERSION"));

pub struct AirtableSource {
    http_client: reqwest::blocking::Client,
    config: SourceConfig,
    collection_url: Url,
}

impl AirtableSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| IngestError::Transport(e.to_string()))?;

        let collection_url = collection_url(&config)?;

        Ok(AirtableSource {
            http_client,
            config,
            collection_url,
        })
    }

    /// Query parameters for one page request
    fn page_params(&self, cursor: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(view) = &self.config.view {
            params.push(("view", view.clone()));
        }
        if let Some(id) = &self.config.template_id {
            params.push(("filterByFormula", template_id_formula(id)));
        }
        if let Some(cursor) = cursor {
            params.push(("offset", cursor.to_string()));
        }
        params
    }
}

impl PageSource for AirtableSource {
    fn fetch_page(&mut self, cursor: Option<&str>) -> Result<Page> {
        let params = self.page_params(cursor);

        tracing::debug!(url = %self.collection_url, cursor = ?cursor, "Requesting page");

        let response = self
            .http_client
            .get(self.collection_url.clone())
            .query(&params)
            .bearer_auth(&self.config.api_key)
            .send()
            .map_err(|e| IngestError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Upstream rejected page request");
            return Err(IngestError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Page>()
            .map_err(|e| IngestError::Decode(e.to_string()))
    }
}

/// `{api_base}/{base_id}/{table}` with each segment percent-encoded
pub fn collection_url(config: &SourceConfig) -> Result<Url> {
    let mut url = Url::parse(&config.api_base)
        .map_err(|e| IngestError::Config(format!("Invalid API base {}: {}", config.api_base, e)))?;
    url.path_segments_mut()
        .map_err(|_| IngestError::Config(format!("API base cannot carry a path: {}", config.api_base)))?
        .pop_if_empty()
        .push(&config.base_id)
        .push(&config.table);
    Ok(url)
}

/// Equality filter on the `template_id` column.
///
/// The value is embedded in a server-side formula string, so backslashes
/// and single quotes are escaped. Callers exposing this to untrusted input
/// should still validate the value first.
pub fn template_id_formula(template_id: &str) -> String {
    let escaped = template_id.replace('\\', "\\\\").replace('\'', "\\'");
    format!("{{template_id}} = '{}'", escaped)
}
