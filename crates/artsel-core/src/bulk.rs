//! Bulk selection by count
//!
//! Grows the selection store to a target size by walking forward through
//! pages, starting at the page currently on screen. The loaded page is reused
//! as-is; later pages are fetched one at a time. Records are picked in page
//! order, then in order within each page, so the same target always selects
//! the same records.
//!
//! The scan stops when the target is reached, when the page range is
//! exhausted, or when a fetch fails. Records added before a failure stay
//! selected.

use tracing::{debug, info, warn};

use crate::models::Artwork;
use crate::selection::SelectionStore;
use crate::source::{PageRequest, RecordSource, SourceError};

/// Page state the scan starts from
#[derive(Debug, Clone, Copy)]
pub struct BulkCursor<'a> {
    /// Page currently loaded (1-based)
    pub current_page: usize,
    /// Records per page
    pub page_size: usize,
    /// Total records reported by the source
    pub total: usize,
    /// Records of the current page, already in memory
    pub loaded: &'a [Artwork],
    /// Fields to request for fetched pages
    pub fields: &'a [String],
}

/// Why a bulk scan ended
#[derive(Debug)]
pub enum StopReason {
    /// Target was zero, already met, or there was nothing to scan
    NothingToDo,
    /// Selection reached the (clamped) target
    TargetReached,
    /// Ran past the last page before reaching the target
    Exhausted,
    /// A page could not be fetched; earlier additions are kept
    FetchFailed(SourceError),
}

/// Result of a bulk scan
#[derive(Debug)]
pub struct BulkOutcome {
    /// Target after clamping to the total record count
    pub target: usize,
    /// Records newly added to the store
    pub added: usize,
    /// Pages fetched from the source (the loaded page is not counted)
    pub pages_fetched: usize,
    /// How the scan ended
    pub stop: StopReason,
}

impl BulkOutcome {
    fn nothing(target: usize) -> Self {
        Self {
            target,
            added: 0,
            pages_fetched: 0,
            stop: StopReason::NothingToDo,
        }
    }

    /// Whether the scan ended on a failed fetch
    pub fn fetch_failed(&self) -> bool {
        matches!(self.stop, StopReason::FetchFailed(_))
    }
}

/// Outcome of scanning one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageScan {
    added: usize,
    target_reached: bool,
}

/// Add unseen records from one page until `target` is reached
fn scan_page(
    records: &[Artwork],
    store: &mut SelectionStore,
    selected: &mut usize,
    target: usize,
) -> PageScan {
    let mut added = 0;

    for record in records {
        if *selected >= target {
            break;
        }
        if !store.has(record.id) {
            store.add(record.clone());
            *selected += 1;
            added += 1;
        }
    }

    PageScan {
        added,
        target_reached: *selected >= target,
    }
}

/// Grow the selection to at least `target` records
///
/// `target` is clamped to the total record count. Existing selections are
/// never removed and no record is added twice.
pub async fn bulk_select<S: RecordSource>(
    source: &S,
    store: &mut SelectionStore,
    cursor: BulkCursor<'_>,
    target: usize,
) -> BulkOutcome {
    if target == 0 || cursor.page_size == 0 || cursor.current_page == 0 {
        return BulkOutcome::nothing(target);
    }

    let target = target.min(cursor.total);
    let mut selected = store.len();
    if target == 0 || selected >= target {
        debug!(target, selected, "Bulk selection target already met");
        return BulkOutcome::nothing(target);
    }

    let mut work_page = cursor.current_page;
    let mut added = 0;
    let mut pages_fetched = 0;
    let mut failure = None;

    debug!(
        target,
        selected,
        start_page = work_page,
        "Starting bulk selection"
    );

    while selected < target && (work_page - 1) * cursor.page_size < cursor.total {
        let fetched: Vec<Artwork>;
        let records: &[Artwork] = if work_page == cursor.current_page {
            cursor.loaded
        } else {
            let request = match PageRequest::new(work_page, cursor.page_size) {
                Ok(request) => request.with_fields(cursor.fields),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            };
            match source.fetch_page(&request).await {
                Ok(page) => {
                    pages_fetched += 1;
                    fetched = page.records;
                    &fetched
                }
                Err(e) => {
                    warn!(page = work_page, error = %e, "Bulk selection stopped on fetch failure");
                    failure = Some(e);
                    break;
                }
            }
        };

        let scan = scan_page(records, store, &mut selected, target);
        added += scan.added;
        debug!(page = work_page, added = scan.added, selected, "Scanned page");

        if scan.target_reached {
            break;
        }
        work_page += 1;
    }

    let stop = match failure {
        Some(e) => StopReason::FetchFailed(e),
        None if selected >= target => StopReason::TargetReached,
        None => StopReason::Exhausted,
    };

    info!(target, added, pages_fetched, total_selected = selected, "Bulk selection finished");

    BulkOutcome {
        target,
        added,
        pages_fetched,
        stop,
    }
}
