//! Selection persistence
//!
//! Serializes the selection store's exported records to a blob store under a
//! fixed key, and reads them back at session start. The stored layout is a
//! plain JSON array of record snapshots with no version marker; a blob that
//! no longer parses is reported as an error and the caller starts empty.

use tracing::debug;

use super::blob::BlobStore;
use super::error::{StorageError, StorageResult};
use crate::models::Artwork;

/// Key the selection is stored under
pub const SELECTION_KEY: &str = "selected_artworks";

/// Saves and restores the selection through a blob store
#[derive(Debug, Clone)]
pub struct SelectionPersistence<B: BlobStore> {
    blobs: B,
}

impl<B: BlobStore> SelectionPersistence<B> {
    pub fn new(blobs: B) -> Self {
        Self { blobs }
    }

    /// The underlying blob store
    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Write the given records as the persisted selection
    ///
    /// An empty selection removes the blob instead of storing `[]`.
    pub fn save(&mut self, records: &[Artwork]) -> StorageResult<()> {
        if records.is_empty() {
            self.blobs.remove(SELECTION_KEY)?;
            debug!("Removed empty selection");
            return Ok(());
        }
        let bytes = serde_json::to_vec(records).map_err(StorageError::Serialize)?;
        self.blobs.set(SELECTION_KEY, &bytes)?;
        debug!(count = records.len(), bytes = bytes.len(), "Saved selection");
        Ok(())
    }

    /// Read the persisted selection
    ///
    /// A missing blob is an empty selection, not an error.
    pub fn restore(&self) -> StorageResult<Vec<Artwork>> {
        let Some(bytes) = self.blobs.get(SELECTION_KEY)? else {
            return Ok(Vec::new());
        };

        serde_json::from_slice(&bytes).map_err(|source| StorageError::Deserialize {
            key: SELECTION_KEY.to_string(),
            source,
        })
    }

    /// Delete the persisted selection along with the rest of the session
    pub fn end_session(&mut self) -> StorageResult<()> {
        self.blobs.clear()
    }
}
