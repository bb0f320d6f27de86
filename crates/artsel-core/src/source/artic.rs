//! Art Institute of Chicago collection API client
//!
//! `GET {base_url}/artworks?page=N&limit=M&fields=a,b,c` answers with
//!
//! ```text
//! {
//!   "pagination": { "total": 129884, "limit": 12, "offset": 0,
//!                   "total_pages": 10824, "current_page": 1, ... },
//!   "data": [ { "id": 1, "title": "...", ... }, ... ]
//! }
//! ```

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use super::error::{SourceError, SourceResult};
use super::{PageRequest, RecordSource};
use crate::config::Config;
use crate::models::{Artwork, Page};

/// User agent sent with every request
const USER_AGENT: &str = concat!("artsel/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ApiResponse {
    pagination: Pagination,
    #[serde(default)]
    data: Vec<Artwork>,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    total: usize,
    #[serde(default)]
    total_pages: usize,
    #[serde(default)]
    current_page: usize,
}

/// HTTP client for the collection API
#[derive(Debug, Clone)]
pub struct ArticClient {
    client: reqwest::Client,
    base_url: String,
}

impl ArticClient {
    /// Create a client for the given API base URL
    pub fn new(base_url: &str, timeout: Duration) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from application configuration
    pub fn from_config(config: &Config) -> SourceResult<Self> {
        Self::new(
            &config.api_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// The API base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the URL for a page request
    pub fn page_url(&self, request: &PageRequest) -> String {
        format!(
            "{}/artworks?page={}&limit={}&fields={}",
            self.base_url,
            request.page,
            request.limit,
            request.fields.join(",")
        )
    }
}

impl RecordSource for ArticClient {
    async fn fetch_page(&self, request: &PageRequest) -> SourceResult<Page> {
        let url = self.page_url(request);
        debug!(page = request.page, limit = request.limit, "Fetching page");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), %url, "Page request rejected");
            return Err(SourceError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        let mut page = parse_page(&body)?;

        // Older API responses omit current_page
        if page.current_page == 0 {
            page.current_page = request.page;
        }

        debug!(
            page = page.current_page,
            records = page.records.len(),
            total = page.total,
            "Fetched page"
        );
        Ok(page)
    }
}

/// Parse a page response body
pub fn parse_page(body: &str) -> SourceResult<Page> {
    let response: ApiResponse = serde_json::from_str(body)?;

    Ok(Page {
        records: response.data,
        total: response.pagination.total,
        total_pages: response.pagination.total_pages,
        current_page: response.pagination.current_page,
    })
}
