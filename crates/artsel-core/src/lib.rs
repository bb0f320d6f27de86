//! artsel core library
//!
//! This crate provides the core functionality for artsel, a terminal browser
//! for a paginated artwork collection that keeps a selection of records
//! across page navigation.
//!
//! # Architecture
//!
//! - **Record source**: serves one page of records plus the total count
//! - **Selection store**: id-keyed set of selected records, independent of
//!   the page on screen
//! - **Projector**: derives the visible selection and reconciles row toggles
//! - **Bulk selector**: selects the first N records by scanning pages forward
//! - **Persistence**: keeps the selection in a session-scoped blob
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let source = ArticClient::from_config(&config)?;
//! let blobs = FileBlobStore::new(config.session_dir());
//! let mut session = Session::new(source, blobs, config.page_size, config.fields.clone());
//!
//! session.restore();
//! session.on_page_change(1, config.page_size).await?;
//! session.on_bulk_count_submit(30).await?;
//! ```
//!
//! # Modules
//!
//! - `session`: event-driven controller (main entry point)
//! - `models`: artwork record and page types
//! - `source`: record source trait and the HTTP client
//! - `selection`: the selection store
//! - `projector`: visible selection and reconciliation
//! - `bulk`: bulk selection by count
//! - `storage`: blob stores and selection persistence
//! - `config`: application configuration

pub mod bulk;
pub mod config;
pub mod models;
pub mod projector;
pub mod selection;
pub mod session;
pub mod source;
pub mod storage;

pub use bulk::{bulk_select, BulkCursor, BulkOutcome, StopReason};
pub use config::Config;
pub use models::{Artwork, Page, DEFAULT_FIELDS};
pub use projector::Reconciliation;
pub use selection::SelectionStore;
pub use session::{PageState, Session, SessionError};
pub use source::{ArticClient, PageRequest, RecordSource, SourceError};
pub use storage::{BlobStore, FileBlobStore, MemoryBlobStore, SelectionPersistence, StorageError};
