//! Source coordinates for the HTTP page source

use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.airtable.com/v0";
pub const DEFAULT_TABLE: &str = "templates";
pub const DEFAULT_VIEW: &str = "Grid view";

/// Where the collection lives and how to reach it
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub api_base: String,
    pub base_id: String,
    pub table: String,
    /// Server-side view; `None` requests the table unfiltered
    pub view: Option<String>,
    pub api_key: String,
    /// Restrict the walk to rows whose `template_id` equals this value
    pub template_id: Option<String>,
    pub timeout: Duration,
}

impl SourceConfig {
    pub fn new(base_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        SourceConfig {
            api_base: DEFAULT_API_BASE.to_string(),
            base_id: base_id.into(),
            table: DEFAULT_TABLE.to_string(),
            view: Some(DEFAULT_VIEW.to_string()),
            api_key: api_key.into(),
            template_id: None,
            timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SourceConfig::new("appX", "key");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.table, "templates");
        assert_eq!(config.view.as_deref(), Some("Grid view"));
        assert_eq!(config.template_id, None);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
