//! Page view projection
//!
//! Bridges the currently loaded page and the global selection store. The
//! visible selection is always derived from both, never stored.

use std::collections::HashSet;

use tracing::debug;

use crate::models::Artwork;
use crate::selection::SelectionStore;

/// What a reconciliation changed in the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Ids newly selected
    pub added: Vec<u64>,
    /// Ids deselected on this page
    pub removed: Vec<u64>,
    /// Ids in the new selection that are not on the loaded page
    pub ignored: Vec<u64>,
}

impl Reconciliation {
    /// Whether the store content changed membership
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Loaded records that are currently selected, in page order
pub fn visible_selection(loaded: &[Artwork], store: &SelectionStore) -> Vec<Artwork> {
    loaded
        .iter()
        .filter(|record| store.has(record.id))
        .cloned()
        .collect()
}

/// Apply a new visible selection for the loaded page to the store
///
/// Removals only touch records on the loaded page; selections made on other
/// pages are never affected. Every record in `new_visible` is written back so
/// the store keeps the latest snapshot. Entries that are not on the loaded
/// page are skipped.
pub fn reconcile(
    loaded: &[Artwork],
    new_visible: &[Artwork],
    store: &mut SelectionStore,
) -> Reconciliation {
    let loaded_ids: HashSet<u64> = loaded.iter().map(|r| r.id).collect();
    let mut result = Reconciliation::default();

    let mut keep: HashSet<u64> = HashSet::with_capacity(new_visible.len());
    for record in new_visible {
        if loaded_ids.contains(&record.id) {
            keep.insert(record.id);
        } else {
            result.ignored.push(record.id);
        }
    }

    for record in loaded {
        if store.has(record.id) && !keep.contains(&record.id) {
            store.remove(record.id);
            result.removed.push(record.id);
        }
    }

    for record in new_visible {
        if keep.contains(&record.id) && store.add(record.clone()) {
            result.added.push(record.id);
        }
    }

    if !result.ignored.is_empty() {
        debug!(ids = ?result.ignored, "Ignoring selection entries not on the loaded page");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ids: &[u64]) -> Vec<Artwork> {
        ids.iter().map(|&id| Artwork::new(id)).collect()
    }

    fn ids(records: &[Artwork]) -> Vec<u64> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_visible_selection_keeps_page_order() {
        let mut store = SelectionStore::new();
        store.extend(page(&[9, 3, 42]));

        let loaded = page(&[42, 7, 3, 8]);
        assert_eq!(ids(&visible_selection(&loaded, &store)), vec![42, 3]);
    }

    #[test]
    fn test_visible_selection_does_not_mutate() {
        let mut store = SelectionStore::new();
        store.add(Artwork::new(5));

        let _ = visible_selection(&page(&[1, 2]), &store);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reconcile_adds_and_removes() {
        let mut store = SelectionStore::new();
        store.extend(page(&[1, 2]));

        let loaded = page(&[1, 2, 3]);
        let result = reconcile(&loaded, &page(&[2, 3]), &mut store);

        assert_eq!(result.added, vec![3]);
        assert_eq!(result.removed, vec![1]);
        assert!(result.changed());
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_deselection_is_scoped_to_page() {
        let mut store = SelectionStore::new();
        // A selected on page 1, B selected on page 2
        store.add(Artwork::new(1));
        store.add(Artwork::new(3));

        // On page 2, the user deselects B
        let page_two = page(&[3, 4]);
        reconcile(&page_two, &[], &mut store);

        assert!(store.has(1));
        assert!(!store.has(3));
    }

    #[test]
    fn test_reconcile_refreshes_snapshot() {
        let mut store = SelectionStore::new();
        store.add(Artwork::new(1).with_title("stale"));

        let loaded = vec![Artwork::new(1).with_title("fresh")];
        let result = reconcile(&loaded, &loaded, &mut store);

        assert!(!result.changed());
        assert_eq!(store.get(1).unwrap().display_title(), "fresh");
    }

    #[test]
    fn test_reconcile_ignores_foreign_entries() {
        let mut store = SelectionStore::new();
        let loaded = page(&[1, 2]);

        let result = reconcile(&loaded, &page(&[2, 77]), &mut store);

        assert_eq!(result.ignored, vec![77]);
        assert!(!store.has(77));
        assert!(store.has(2));
    }
}
