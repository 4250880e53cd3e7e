use crate::error::{IngestError, Result};
use crate::ingest::source::PageSource;
use crate::normalize::RawRecord;
use std::collections::HashSet;

/// Limits on a single collection walk
#[derive(Debug, Clone, Default)]
pub struct CollectorConfig {
    /// Fail once more than this many pages have been requested (`None` = no limit)
    pub max_pages: Option<usize>,
}

/// Walks a paginated collection to completion.
///
/// The walk is all-or-nothing: the first failed page aborts it and no
/// records from earlier pages are returned. A continuation token seen
/// before in the same walk is treated as a cycle and fails it as well.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    config: CollectorConfig,
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Self {
        Collector { config }
    }

    /// Fetch every page, concatenating records in page order
    pub fn collect<S: PageSource + ?Sized>(&self, source: &mut S) -> Result<Vec<RawRecord>> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;
        let mut seen: HashSet<String> = HashSet::new();

        loop {
            if let Some(max) = self.config.max_pages {
                if pages >= max {
                    return Err(IngestError::PageLimit(max));
                }
            }

            let page = source.fetch_page(cursor.as_deref())?;
            pages += 1;

            tracing::debug!(
                page = pages,
                records = page.records.len(),
                more = page.offset.is_some(),
                "Fetched page"
            );

            records.extend(page.records);

            match page.offset {
                Some(next) if seen.contains(&next) => {
                    return Err(IngestError::CursorLoop(next));
                }
                Some(next) => {
                    seen.insert(next.clone());
                    cursor = Some(next);
                }
                None => break,
            }
        }

        tracing::info!(pages, records = records.len(), "Collection complete");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::source::{MemorySource, Page, Reply};
    use serde_json::Map;

    fn recs(ids: &[&str]) -> Vec<RawRecord> {
        ids.iter().map(|id| RawRecord::new(*id, Map::new())).collect()
    }

    fn ids(records: &[RawRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_single_page() {
        let mut source = MemorySource::new(vec![Reply::Page(Page::last(recs(&["a", "b"])))]);
        let records = Collector::default().collect(&mut source).unwrap();
        assert_eq!(ids(&records), ["a", "b"]);
        assert_eq!(source.requests(), &[None::<String>]);
    }

    #[test]
    fn test_pages_concatenate_in_request_order() {
        let mut source = MemorySource::from_record_pages(vec![
            recs(&["a", "b"]),
            recs(&["c"]),
            recs(&[]),
            recs(&["d", "e"]),
        ]);
        let records = Collector::default().collect(&mut source).unwrap();
        assert_eq!(ids(&records), ["a", "b", "c", "d", "e"]);
        assert_eq!(source.requests().len(), 4);
        assert_eq!(source.requests()[1].as_deref(), Some("page2"));
    }

    #[test]
    fn test_failure_discards_earlier_pages() {
        let mut source = MemorySource::new(vec![
            Reply::Page(Page::new(recs(&["a"]), Some("next".to_string()))),
            Reply::Failure {
                status: 429,
                body: "rate limited".to_string(),
            },
        ]);
        let err = Collector::default().collect(&mut source).unwrap_err();
        match err {
            IngestError::Upstream { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
        // No retry after the failure
        assert_eq!(source.requests().len(), 2);
    }

    #[test]
    fn test_repeated_cursor_is_an_error() {
        let mut source = MemorySource::new(vec![
            Reply::Page(Page::new(recs(&["a"]), Some("same".to_string()))),
            Reply::Page(Page::new(recs(&["b"]), Some("same".to_string()))),
        ]);
        let err = Collector::default().collect(&mut source).unwrap_err();
        assert!(matches!(err, IngestError::CursorLoop(ref c) if c == "same"));
    }

    #[test]
    fn test_cursor_cycle_is_an_error() {
        let mut source = MemorySource::new(vec![
            Reply::Page(Page::new(recs(&["a"]), Some("A".to_string()))),
            Reply::Page(Page::new(recs(&["b"]), Some("B".to_string()))),
            Reply::Page(Page::new(recs(&["c"]), Some("A".to_string()))),
            Reply::Page(Page::last(recs(&["d"]))),
        ]);
        let err = Collector::default().collect(&mut source).unwrap_err();
        assert!(matches!(err, IngestError::CursorLoop(ref c) if c == "A"));
        assert_eq!(source.requests().len(), 3);
    }

    #[test]
    fn test_page_limit() {
        let mut source = MemorySource::from_record_pages(vec![recs(&["a"]), recs(&["b"]), recs(&["c"])]);
        let collector = Collector::new(CollectorConfig { max_pages: Some(2) });
        let err = collector.collect(&mut source).unwrap_err();
        assert!(matches!(err, IngestError::PageLimit(2)));
        assert_eq!(source.requests().len(), 2);
    }
}
