//! In-memory record source
//!
//! Serves a fixed list of records split into pages. Individual pages can be
//! marked as failing, and every served request is recorded so callers can
//! check which pages were actually fetched.

use std::collections::HashSet;
use std::sync::Mutex;

use super::error::{SourceError, SourceResult};
use super::{PageRequest, RecordSource};
use crate::models::{Artwork, Page};

/// Record source backed by a vector of records
#[derive(Debug, Default)]
pub struct StaticSource {
    records: Vec<Artwork>,
    failing: HashSet<usize>,
    requests: Mutex<Vec<usize>>,
}

impl StaticSource {
    /// Serve the given records in order
    pub fn new(records: Vec<Artwork>) -> Self {
        Self {
            records,
            failing: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Serve records with ids `1..=count`
    pub fn with_ids(count: u64) -> Self {
        Self::new(
            (1..=count)
                .map(|id| Artwork::new(id).with_title(format!("Artwork {}", id)))
                .collect(),
        )
    }

    /// Make every request for `page` fail
    pub fn fail_on(mut self, page: usize) -> Self {
        self.failing.insert(page);
        self
    }

    /// Page numbers requested so far, in request order
    pub fn requested_pages(&self) -> Vec<usize> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn serve(&self, request: &PageRequest) -> SourceResult<Page> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.page);

        if self.failing.contains(&request.page) {
            return Err(SourceError::Unavailable {
                page: request.page,
                reason: "simulated failure".to_string(),
            });
        }

        let total = self.records.len();
        let start = (request.page - 1).saturating_mul(request.limit).min(total);
        let end = start.saturating_add(request.limit).min(total);

        Ok(Page {
            records: self.records[start..end].to_vec(),
            total,
            total_pages: total.div_ceil(request.limit),
            current_page: request.page,
        })
    }
}

impl RecordSource for StaticSource {
    async fn fetch_page(&self, request: &PageRequest) -> SourceResult<Page> {
        self.serve(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_split_records() {
        let source = StaticSource::with_ids(5);

        let first = source
            .fetch_page(&PageRequest::new(1, 2).unwrap())
            .await
            .unwrap();
        let last = source
            .fetch_page(&PageRequest::new(3, 2).unwrap())
            .await
            .unwrap();
        let beyond = source
            .fetch_page(&PageRequest::new(9, 2).unwrap())
            .await
            .unwrap();

        assert_eq!(first.records.iter().map(|r| r.id).collect::<Vec<_>>(), [1, 2]);
        assert_eq!(last.records.iter().map(|r| r.id).collect::<Vec<_>>(), [5]);
        assert!(beyond.records.is_empty());
        assert_eq!(first.total, 5);
        assert_eq!(first.total_pages, 3);
        assert_eq!(source.requested_pages(), vec![1, 3, 9]);
    }

    #[tokio::test]
    async fn test_failing_page() {
        let source = StaticSource::with_ids(4).fail_on(2);

        assert!(source
            .fetch_page(&PageRequest::new(1, 2).unwrap())
            .await
            .is_ok());
        assert!(matches!(
            source.fetch_page(&PageRequest::new(2, 2).unwrap()).await,
            Err(SourceError::Unavailable { page: 2, .. })
        ));
    }
}
