//! Selection session
//!
//! `Session` owns the one selection store, the page state and the persistence
//! adapter, and turns rendering-layer events into store mutations:
//!
//! - page change: fetch the page, replace the loaded records
//! - selection toggle: reconcile the visible selection, then save
//! - bulk count: scan forward for unseen records, then save once
//! - clear all: empty the store, then save
//!
//! Every event handler takes `&mut self`, so a bulk scan and a page
//! navigation can never interleave. Persistence failures are logged and kept
//! as `last_persist_error`; the in-memory selection keeps working.

use thiserror::Error;
use tracing::{info, warn};

use crate::bulk::{bulk_select, BulkCursor, BulkOutcome};
use crate::models::Artwork;
use crate::projector::{self, Reconciliation};
use crate::selection::SelectionStore;
use crate::source::{PageRequest, RecordSource, SourceError};
use crate::storage::{BlobStore, SelectionPersistence, StorageResult};

/// Errors surfaced by session events
#[derive(Error, Debug)]
pub enum SessionError {
    /// Event parameters rejected before any mutation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The record source failed; prior state is unchanged
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl SessionError {
    /// Whether the same event could succeed if retried
    pub fn is_transient(&self) -> bool {
        match self {
            SessionError::Source(e) => e.is_transient(),
            SessionError::InvalidInput(_) => false,
        }
    }
}

/// Pagination cursor and the records of the loaded page
#[derive(Debug, Clone, Default)]
pub struct PageState {
    /// Loaded page number (1-based, 0 before the first load)
    pub page: usize,
    /// Records per page
    pub page_size: usize,
    /// Records of the loaded page, in server order
    pub records: Vec<Artwork>,
    /// Total records reported by the source
    pub total: usize,
}

impl PageState {
    /// Number of pages at the current page size
    pub fn total_pages(&self) -> usize {
        if self.page_size == 0 {
            0
        } else {
            self.total.div_ceil(self.page_size)
        }
    }

    /// Whether a page has been loaded yet
    pub fn is_loaded(&self) -> bool {
        self.page > 0
    }
}

/// A selection session over one record source
pub struct Session<S: RecordSource, B: BlobStore> {
    source: S,
    persistence: SelectionPersistence<B>,
    selection: SelectionStore,
    state: PageState,
    fields: Vec<String>,
    loading: bool,
    restored: bool,
    restore_error: Option<String>,
    last_persist_error: Option<String>,
}

impl<S: RecordSource, B: BlobStore> Session<S, B> {
    /// Create a session with an empty selection
    ///
    /// Call [`Session::restore`] before loading the first page.
    pub fn new(source: S, blobs: B, page_size: usize, fields: Vec<String>) -> Self {
        Self {
            source,
            persistence: SelectionPersistence::new(blobs),
            selection: SelectionStore::new(),
            state: PageState {
                page_size: page_size.max(1),
                ..PageState::default()
            },
            fields,
            loading: false,
            restored: false,
            restore_error: None,
            last_persist_error: None,
        }
    }

    /// Rehydrate the selection from storage
    ///
    /// Runs once per session; later calls do nothing. An unreadable blob is
    /// logged and the session starts with an empty selection.
    pub fn restore(&mut self) -> usize {
        if self.restored {
            return 0;
        }
        self.restored = true;

        match self.persistence.restore() {
            Ok(records) => {
                let count = records.len();
                self.selection.extend(records);
                info!(count, "Restored selection");
                count
            }
            Err(e) => {
                let message = e.describe();
                warn!(error = %message, "Could not restore selection, starting empty");
                self.restore_error = Some(message);
                0
            }
        }
    }

    // ==================== Rendering layer events ====================

    /// Load `page` at `page_size`
    ///
    /// On failure the previously loaded page stays in place and the loading
    /// flag stays raised until a later load succeeds.
    pub async fn on_page_change(
        &mut self,
        page: usize,
        page_size: usize,
    ) -> Result<(), SessionError> {
        let request = PageRequest::new(page, page_size)
            .map_err(|e| SessionError::InvalidInput(e.to_string()))?
            .with_fields(&self.fields);

        self.loading = true;
        let fetched = match self.source.fetch_page(&request).await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(page, page_size, error = %e, "Page load failed");
                return Err(e.into());
            }
        };

        self.state = PageState {
            page,
            page_size,
            records: fetched.records,
            total: fetched.total,
        };
        self.loading = false;
        Ok(())
    }

    /// Apply the user's new selection for the visible rows, then save
    pub fn on_selection_toggle(&mut self, new_visible: &[Artwork]) -> Reconciliation {
        let result = projector::reconcile(&self.state.records, new_visible, &mut self.selection);
        self.persist();
        result
    }

    /// Run bulk selection up to `count` records, then save
    ///
    /// Non-positive counts are rejected without touching the selection.
    pub async fn on_bulk_count_submit(&mut self, count: i64) -> Result<BulkOutcome, SessionError> {
        if count <= 0 {
            return Err(SessionError::InvalidInput(format!(
                "selection count must be positive, got {}",
                count
            )));
        }
        let target = usize::try_from(count).unwrap_or(usize::MAX);

        let cursor = BulkCursor {
            current_page: self.state.page,
            page_size: self.state.page_size,
            total: self.state.total,
            loaded: &self.state.records,
            fields: &self.fields,
        };

        // A stalled page stays stalled; only a page load clears it
        let was_loading = self.loading;
        self.loading = true;
        let outcome = bulk_select(&self.source, &mut self.selection, cursor, target).await;
        self.loading = was_loading;

        self.persist();
        Ok(outcome)
    }

    /// Deselect everything, then save
    pub fn on_clear_all(&mut self) {
        self.selection.clear();
        self.persist();
    }

    /// End the session: deselect everything and delete the saved selection
    ///
    /// Returns how many records were deselected.
    pub fn end(&mut self) -> StorageResult<usize> {
        let count = self.selection.len();
        self.selection.clear();
        self.persistence.end_session()?;
        self.last_persist_error = None;
        info!(count, "Session ended");
        Ok(count)
    }

    // ==================== Convenience events ====================

    /// Toggle one visible row by id
    ///
    /// Returns the row's new selected state, or `None` if the id is not on
    /// the loaded page.
    pub fn toggle_record(&mut self, id: u64) -> Option<bool> {
        let record = self.state.records.iter().find(|r| r.id == id)?.clone();
        let mut visible = self.visible_selection();

        let now_selected = if self.selection.has(id) {
            visible.retain(|r| r.id != id);
            false
        } else {
            visible.push(record);
            true
        };

        self.on_selection_toggle(&visible);
        Some(now_selected)
    }

    /// Select or deselect every visible row
    pub fn select_page(&mut self, select: bool) -> Reconciliation {
        let visible = if select {
            self.state.records.clone()
        } else {
            Vec::new()
        };
        self.on_selection_toggle(&visible)
    }

    /// Reload the current page
    pub async fn refresh(&mut self) -> Result<(), SessionError> {
        let page = self.state.page.max(1);
        self.on_page_change(page, self.state.page_size).await
    }

    /// Load the next page if there is one
    pub async fn next_page(&mut self) -> Result<bool, SessionError> {
        if self.state.page >= self.state.total_pages() {
            return Ok(false);
        }
        self.on_page_change(self.state.page + 1, self.state.page_size)
            .await?;
        Ok(true)
    }

    /// Load the previous page if there is one
    pub async fn prev_page(&mut self) -> Result<bool, SessionError> {
        if self.state.page <= 1 {
            return Ok(false);
        }
        self.on_page_change(self.state.page - 1, self.state.page_size)
            .await?;
        Ok(true)
    }

    /// Change the page size, keeping the first visible record on screen
    pub async fn set_page_size(&mut self, page_size: usize) -> Result<(), SessionError> {
        let first_index = self.state.page.saturating_sub(1) * self.state.page_size;
        let page = first_index / page_size.max(1) + 1;
        self.on_page_change(page, page_size).await
    }

    // ==================== Accessors ====================

    /// Records of the loaded page
    pub fn visible_records(&self) -> &[Artwork] {
        &self.state.records
    }

    /// Loaded records that are selected, in page order
    pub fn visible_selection(&self) -> Vec<Artwork> {
        projector::visible_selection(&self.state.records, &self.selection)
    }

    /// Whether a record id is selected
    pub fn is_selected(&self, id: u64) -> bool {
        self.selection.has(id)
    }

    /// Whether a load is in progress or the last page load failed
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Size of the selection across all pages
    pub fn total_selected(&self) -> usize {
        self.selection.len()
    }

    /// Snapshot of every selected record
    pub fn selected_values(&self) -> Vec<Artwork> {
        self.selection.values()
    }

    pub fn current_page(&self) -> usize {
        self.state.page
    }

    pub fn page_size(&self) -> usize {
        self.state.page_size
    }

    pub fn total_records(&self) -> usize {
        self.state.total
    }

    pub fn total_pages(&self) -> usize {
        self.state.total_pages()
    }

    /// Full page state
    pub fn page_state(&self) -> &PageState {
        &self.state
    }

    /// Why the saved selection could not be restored, if it couldn't
    pub fn restore_error(&self) -> Option<&str> {
        self.restore_error.as_deref()
    }

    /// Message of the last failed save, cleared by the next successful one
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// The blob store the selection is saved to
    pub fn blobs(&self) -> &B {
        self.persistence.blobs()
    }

    /// Save the selection, logging failures
    fn persist(&mut self) {
        match self.persistence.save(&self.selection.values()) {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                warn!(error = %e, "Failed to save selection; keeping it in memory");
                self.last_persist_error = Some(e.describe());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::StopReason;
    use crate::source::StaticSource;
    use crate::storage::{MemoryBlobStore, SELECTION_KEY};

    fn fields() -> Vec<String> {
        vec!["id".to_string(), "title".to_string()]
    }

    fn session(source: StaticSource, page_size: usize) -> Session<StaticSource, MemoryBlobStore> {
        Session::new(source, MemoryBlobStore::new(), page_size, fields())
    }

    fn ids(records: &[Artwork]) -> Vec<u64> {
        records.iter().map(|r| r.id).collect()
    }

    fn persisted_ids(session: &Session<StaticSource, MemoryBlobStore>) -> Vec<u64> {
        let Some(bytes) = session.blobs().get(SELECTION_KEY).unwrap() else {
            return Vec::new();
        };
        let records: Vec<Artwork> = serde_json::from_slice(&bytes).unwrap();
        ids(&records)
    }

    #[tokio::test]
    async fn test_restore_then_fetch_shows_selection() {
        let mut blobs = MemoryBlobStore::new();
        blobs
            .set(SELECTION_KEY, br#"[{"id": 5, "title": "persisted"}]"#)
            .unwrap();
        let mut session = Session::new(StaticSource::with_ids(12), blobs, 6, fields());

        assert_eq!(session.restore(), 1);
        session.on_page_change(1, 6).await.unwrap();

        assert_eq!(ids(&session.visible_selection()), vec![5]);
        assert_eq!(session.total_selected(), 1);
    }

    #[tokio::test]
    async fn test_restore_runs_once() {
        let mut blobs = MemoryBlobStore::new();
        blobs.set(SELECTION_KEY, br#"[{"id": 1}]"#).unwrap();
        let mut session = Session::new(StaticSource::with_ids(4), blobs, 2, fields());

        assert_eq!(session.restore(), 1);
        session.on_clear_all();
        assert_eq!(session.restore(), 0);
        assert_eq!(session.total_selected(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_blob_starts_empty() {
        let mut blobs = MemoryBlobStore::new();
        blobs.set(SELECTION_KEY, b"not json").unwrap();
        let mut session = Session::new(StaticSource::with_ids(4), blobs, 2, fields());

        assert_eq!(session.restore(), 0);
        assert!(session
            .restore_error()
            .unwrap()
            .contains("artsel selection clear"));
        session.on_page_change(1, 2).await.unwrap();
        assert_eq!(session.toggle_record(1), Some(true));
        assert_eq!(persisted_ids(&session), vec![1]);
    }

    #[tokio::test]
    async fn test_selection_survives_navigation() {
        let mut session = session(StaticSource::with_ids(4), 2);
        session.on_page_change(1, 2).await.unwrap();
        session.toggle_record(1);

        session.next_page().await.unwrap();
        session.toggle_record(3);
        assert_eq!(ids(&session.visible_selection()), vec![3]);

        // Deselecting on page 2 leaves page 1 alone
        session.toggle_record(3);
        assert!(session.is_selected(1));
        assert!(!session.is_selected(3));

        session.prev_page().await.unwrap();
        assert_eq!(ids(&session.visible_selection()), vec![1]);
        assert_eq!(persisted_ids(&session), vec![1]);
    }

    #[tokio::test]
    async fn test_toggle_unknown_row() {
        let mut session = session(StaticSource::with_ids(4), 2);
        session.on_page_change(1, 2).await.unwrap();

        assert_eq!(session.toggle_record(99), None);
        assert_eq!(session.total_selected(), 0);
    }

    #[tokio::test]
    async fn test_select_page() {
        let mut session = session(StaticSource::with_ids(6), 3);
        session.on_page_change(2, 3).await.unwrap();

        let result = session.select_page(true);
        assert_eq!(result.added, vec![4, 5, 6]);

        let result = session.select_page(false);
        assert_eq!(result.removed, vec![4, 5, 6]);
        assert_eq!(session.total_selected(), 0);
    }

    #[tokio::test]
    async fn test_bulk_count_submit() {
        let mut session = session(StaticSource::with_ids(4), 2);
        session.on_page_change(1, 2).await.unwrap();

        let outcome = session.on_bulk_count_submit(3).await.unwrap();

        assert!(matches!(outcome.stop, StopReason::TargetReached));
        assert_eq!(ids(&session.selected_values()), vec![1, 2, 3]);
        assert_eq!(ids(&session.visible_selection()), vec![1, 2]);
        assert_eq!(persisted_ids(&session), vec![1, 2, 3]);
        assert!(!session.is_loading());
        // Still on page 1
        assert_eq!(session.current_page(), 1);
    }

    #[tokio::test]
    async fn test_bulk_rejects_non_positive_count() {
        let mut session = session(StaticSource::with_ids(4), 2);
        session.on_page_change(1, 2).await.unwrap();

        assert!(matches!(
            session.on_bulk_count_submit(0).await,
            Err(SessionError::InvalidInput(_))
        ));
        assert!(matches!(
            session.on_bulk_count_submit(-3).await,
            Err(SessionError::InvalidInput(_))
        ));
        assert_eq!(session.total_selected(), 0);
        assert!(session.blobs().get(SELECTION_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bulk_fetch_failure_keeps_progress() {
        let mut session = session(StaticSource::with_ids(10).fail_on(2), 2);
        session.on_page_change(1, 2).await.unwrap();

        let outcome = session.on_bulk_count_submit(5).await.unwrap();

        assert!(outcome.fetch_failed());
        assert_eq!(session.total_selected(), 2);
        assert_eq!(persisted_ids(&session), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_page_load_failure_preserves_state() {
        let mut session = session(StaticSource::with_ids(10).fail_on(3), 2);
        session.on_page_change(2, 2).await.unwrap();

        let result = session.on_page_change(3, 2).await;

        assert!(matches!(result, Err(SessionError::Source(_))));
        assert_eq!(session.current_page(), 2);
        assert_eq!(ids(session.visible_records()), vec![3, 4]);
        assert!(session.is_loading());

        session.on_page_change(4, 2).await.unwrap();
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_invalid_page_change() {
        let mut session = session(StaticSource::with_ids(4), 2);

        assert!(matches!(
            session.on_page_change(0, 2).await,
            Err(SessionError::InvalidInput(_))
        ));
        assert!(matches!(
            session.on_page_change(1, 0).await,
            Err(SessionError::InvalidInput(_))
        ));
        assert!(!session.page_state().is_loaded());
    }

    #[tokio::test]
    async fn test_persist_failure_is_not_fatal() {
        let mut session = Session::new(StaticSource::with_ids(4), MemoryBlobStore::full(), 2, fields());
        session.on_page_change(1, 2).await.unwrap();

        assert_eq!(session.toggle_record(2), Some(true));
        assert!(session.is_selected(2));
        assert!(session
            .last_persist_error()
            .unwrap()
            .contains("Free up disk space"));
    }

    #[tokio::test]
    async fn test_bulk_keeps_stalled_page_flag() {
        let mut session = session(StaticSource::with_ids(10).fail_on(2), 2);
        session.on_page_change(1, 2).await.unwrap();
        let err = session.on_page_change(2, 2).await.unwrap_err();
        assert!(err.is_transient());
        assert!(session.is_loading());

        session.on_bulk_count_submit(1).await.unwrap();
        assert!(session.is_loading());
        assert_eq!(session.total_selected(), 1);

        session.refresh().await.unwrap();
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_end_discards_saved_selection() {
        let mut session = session(StaticSource::with_ids(4), 2);
        session.on_page_change(1, 2).await.unwrap();
        session.select_page(true);
        assert!(session.blobs().get(SELECTION_KEY).unwrap().is_some());

        assert_eq!(session.end().unwrap(), 2);

        assert_eq!(session.total_selected(), 0);
        assert!(session.blobs().get(SELECTION_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_all() {
        let mut session = session(StaticSource::with_ids(4), 2);
        session.on_page_change(1, 2).await.unwrap();
        session.on_bulk_count_submit(4).await.unwrap();

        session.on_clear_all();

        assert_eq!(session.total_selected(), 0);
        assert!(persisted_ids(&session).is_empty());
    }

    #[tokio::test]
    async fn test_navigation_bounds() {
        let mut session = session(StaticSource::with_ids(5), 2);
        session.on_page_change(1, 2).await.unwrap();

        assert!(!session.prev_page().await.unwrap());
        assert!(session.next_page().await.unwrap());
        assert!(session.next_page().await.unwrap());
        assert_eq!(session.current_page(), 3);
        assert!(!session.next_page().await.unwrap());
        assert_eq!(session.total_pages(), 3);
    }

    #[tokio::test]
    async fn test_set_page_size_keeps_position() {
        let mut session = session(StaticSource::with_ids(30), 5);
        session.on_page_change(3, 5).await.unwrap();
        // First visible record is index 10 (id 11)

        session.set_page_size(4).await.unwrap();

        assert_eq!(session.current_page(), 3);
        assert_eq!(session.visible_records()[0].id, 9);
        assert_eq!(session.page_size(), 4);
    }
}
