use crate::error::{IngestError, Result};
use crate::normalize::RawRecord;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

/// One page of a paginated collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub records: Vec<RawRecord>,

    /// Continuation token; absent on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

impl Page {
    pub fn new(records: Vec<RawRecord>, offset: Option<String>) -> Self {
        Page { records, offset }
    }

    pub fn last(records: Vec<RawRecord>) -> Self {
        Page { records, offset: None }
    }
}

/// A collection that can be fetched one page at a time.
///
/// `cursor` is `None` for the first page and the previous page's `offset`
/// afterwards.
pub trait PageSource {
    fn fetch_page(&mut self, cursor: Option<&str>) -> Result<Page>;
}

impl<S: PageSource + ?Sized> PageSource for &mut S {
    fn fetch_page(&mut self, cursor: Option<&str>) -> Result<Page> {
        (**self).fetch_page(cursor)
    }
}

/// A scripted reply for [`MemorySource`]
#[derive(Debug, Clone)]
pub enum Reply {
    Page(Page),
    Failure { status: u16, body: String },
}

/// Serves pre-built pages in order, recording the cursors it was asked for
#[derive(Debug, Default)]
pub struct MemorySource {
    replies: VecDeque<Reply>,
    requests: Vec<Option<String>>,
}

impl MemorySource {
    pub fn new(replies: Vec<Reply>) -> Self {
        MemorySource {
            replies: replies.into(),
            requests: Vec::new(),
        }
    }

    /// Chain plain pages, giving each but the last a synthetic offset
    pub fn from_record_pages(pages: Vec<Vec<RawRecord>>) -> Self {
        let count = pages.len();
        let replies = pages
            .into_iter()
            .enumerate()
            .map(|(idx, records)| {
                let offset = (idx + 1 < count).then(|| format!("page{}", idx + 2));
                Reply::Page(Page::new(records, offset))
            })
            .collect();
        MemorySource::new(replies)
    }

    /// Load a JSON array of page objects (`{"records": [...], "offset": ...}`)
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pages file: {}", path.display()))?;
        let pages: Vec<Page> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse pages file: {}", path.display()))?;
        Ok(MemorySource::new(pages.into_iter().map(Reply::Page).collect()))
    }

    /// Cursors received so far, in request order
    pub fn requests(&self) -> &[Option<String>] {
        &self.requests
    }
}

impl PageSource for MemorySource {
    fn fetch_page(&mut self, cursor: Option<&str>) -> Result<Page> {
        self.requests.push(cursor.map(str::to_string));
        match self.replies.pop_front() {
            Some(Reply::Page(page)) => Ok(page),
            Some(Reply::Failure { status, body }) => Err(IngestError::Upstream { status, body }),
            None => Err(IngestError::Upstream {
                status: 404,
                body: format!("no page for cursor {:?}", cursor),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_decodes_source_shape() {
        let page: Page = serde_json::from_value(json!({
            "records": [
                {"id": "rec1", "createdTime": "2024-01-01T00:00:00.000Z", "fields": {"name": "A"}},
                {"id": "rec2"}
            ],
            "offset": "itrABC/rec2"
        }))
        .unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].fields["name"], "A");
        assert!(page.records[1].fields.is_empty());
        assert_eq!(page.offset.as_deref(), Some("itrABC/rec2"));

        let last: Page = serde_json::from_value(json!({"records": []})).unwrap();
        assert_eq!(last.offset, None);
    }

    #[test]
    fn test_memory_source_chains_offsets() {
        let mut source = MemorySource::from_record_pages(vec![vec![], vec![], vec![]]);
        assert_eq!(source.fetch_page(None).unwrap().offset.as_deref(), Some("page2"));
        assert_eq!(source.fetch_page(Some("page2")).unwrap().offset.as_deref(), Some("page3"));
        assert_eq!(source.fetch_page(Some("page3")).unwrap().offset, None);
        assert_eq!(
            source.requests(),
            &[None, Some("page2".to_string()), Some("page3".to_string())]
        );
    }
}
