//! Data models for artsel
//!
//! Defines the record type served by the collection API and the page
//! envelope the record source returns. Records are opaque pass-through
//! snapshots: identity is the numeric `id`, every other field is carried
//! as-is and never merged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields requested from the collection API by default
pub const DEFAULT_FIELDS: &[&str] = &[
    "id",
    "title",
    "place_of_origin",
    "artist_display",
    "inscriptions",
    "date_start",
    "date_end",
];

/// One artwork record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artwork {
    /// Unique identifier (identity of the record)
    pub id: u64,
    /// Display title
    #[serde(default)]
    pub title: Option<String>,
    /// Where the work was made
    #[serde(default)]
    pub place_of_origin: Option<String>,
    /// Artist name, nationality and dates as displayed by the museum
    #[serde(default)]
    pub artist_display: Option<String>,
    /// Inscriptions on the object
    #[serde(default)]
    pub inscriptions: Option<String>,
    /// Earliest year associated with the work
    #[serde(default)]
    pub date_start: Option<i32>,
    /// Latest year associated with the work
    #[serde(default)]
    pub date_end: Option<i32>,
    /// Any other requested fields, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Artwork {
    /// Create a bare record with only an id
    pub fn new(id: u64) -> Self {
        Self {
            id,
            title: None,
            place_of_origin: None,
            artist_display: None,
            inscriptions: None,
            date_start: None,
            date_end: None,
            extra: Map::new(),
        }
    }

    /// Builder-style title setter
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Whether two records describe the same logical entity
    ///
    /// Only the id counts; field differences are ignored.
    pub fn same_entity(&self, other: &Artwork) -> bool {
        self.id == other.id
    }

    /// Title for display, falling back to a placeholder
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }

    /// Human-readable date range
    pub fn date_range(&self) -> Option<String> {
        match (self.date_start, self.date_end) {
            (Some(start), Some(end)) if start == end => Some(start.to_string()),
            (Some(start), Some(end)) => Some(format!("{} – {}", start, end)),
            (Some(year), None) | (None, Some(year)) => Some(year.to_string()),
            (None, None) => None,
        }
    }

    /// Public collection page for this record
    pub fn web_url(&self) -> String {
        format!("https://www.artic.edu/artworks/{}", self.id)
    }
}

/// One page of records as returned by a record source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Records on this page, in server order
    pub records: Vec<Artwork>,
    /// Total number of records across all pages
    pub total: usize,
    /// Total number of pages at the requested page size
    pub total_pages: usize,
    /// The page number the server answered for (1-based)
    pub current_page: usize,
}
