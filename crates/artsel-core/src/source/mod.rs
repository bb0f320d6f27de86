//! Record source
//!
//! A record source answers one question: "give me page N at size M".
//! It returns the page's records together with the total record count.
//!
//! - `ArticClient`: the Art Institute of Chicago collection API over HTTP
//! - `StaticSource` (feature `test-support`): fixed in-memory pages

pub mod artic;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod fixture;

use std::future::Future;

use crate::models::{Page, DEFAULT_FIELDS};

pub use artic::{parse_page, ArticClient};
pub use error::{SourceError, SourceResult};
#[cfg(any(test, feature = "test-support"))]
pub use fixture::StaticSource;

/// A request for one page of records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: usize,
    /// Records per page
    pub limit: usize,
    /// Fields to include in each record
    pub fields: Vec<String>,
}

impl PageRequest {
    /// Build a request for the default field list
    ///
    /// Page numbers start at 1 and the page size must be positive.
    pub fn new(page: usize, limit: usize) -> SourceResult<Self> {
        if page == 0 {
            return Err(SourceError::InvalidRequest(
                "page numbers start at 1".to_string(),
            ));
        }
        if limit == 0 {
            return Err(SourceError::InvalidRequest(
                "page size must be positive".to_string(),
            ));
        }
        Ok(Self {
            page,
            limit,
            fields: DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
        })
    }

    /// Replace the requested field list
    ///
    /// `id` is always requested since selection is keyed on it.
    pub fn with_fields(mut self, fields: &[String]) -> Self {
        let mut list: Vec<String> = fields.to_vec();
        if !list.iter().any(|f| f == "id") {
            list.insert(0, "id".to_string());
        }
        self.fields = list;
        self
    }
}

/// Anything that can serve pages of records
///
/// Fetches are awaited one at a time by callers; implementations don't need
/// to support concurrent requests.
pub trait RecordSource {
    /// Fetch one page of records
    fn fetch_page(&self, request: &PageRequest)
        -> impl Future<Output = SourceResult<Page>> + Send;
}
