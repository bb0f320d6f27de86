//! Storage layer
//!
//! Persists the selection for the lifetime of a session.
//!
//! ## Layout
//!
//! ```text
//! {data_dir}/sessions/{session}/
//! └── selected_artworks.json   # JSON array of record snapshots
//! ```
//!
//! Ending a session removes its directory.

pub mod blob;
pub mod error;
pub mod persistence;

pub use blob::{BlobStore, FileBlobStore, MemoryBlobStore};
pub use error::{StorageError, StorageResult};
pub use persistence::{SelectionPersistence, SELECTION_KEY};
