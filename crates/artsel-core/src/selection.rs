//! Selection store
//!
//! The cross-page set of selected records, keyed by record id. It only holds
//! state in memory; saving is an explicit step so several mutations can be
//! batched before one write.

use std::collections::BTreeMap;

use crate::models::Artwork;

/// Identity-keyed set of selected records
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    records: BTreeMap<u64, Artwork>,
}

impl SelectionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any previous snapshot with the same id
    ///
    /// Returns `true` if the id was not selected before.
    pub fn add(&mut self, record: Artwork) -> bool {
        self.records.insert(record.id, record).is_none()
    }

    /// Insert many records (last snapshot per id wins)
    pub fn extend(&mut self, records: impl IntoIterator<Item = Artwork>) {
        for record in records {
            self.add(record);
        }
    }

    /// Remove a record by id
    ///
    /// Returns `true` if something was removed.
    pub fn remove(&mut self, id: u64) -> bool {
        self.records.remove(&id).is_some()
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Whether the id is selected
    pub fn has(&self, id: u64) -> bool {
        self.records.contains_key(&id)
    }

    /// Number of selected records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stored snapshot for an id
    pub fn get(&self, id: u64) -> Option<&Artwork> {
        self.records.get(&id)
    }

    /// Snapshot of all selected records, ordered by id
    pub fn values(&self) -> Vec<Artwork> {
        self.records.values().cloned().collect()
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.records.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut store = SelectionStore::new();

        assert!(store.add(Artwork::new(1)));
        assert!(!store.add(Artwork::new(1)));
        assert_eq!(store.len(), 1);
        assert!(store.has(1));
    }

    #[test]
    fn test_add_overwrites_snapshot() {
        let mut store = SelectionStore::new();
        store.add(Artwork::new(1).with_title("Old"));
        store.add(Artwork::new(1).with_title("New"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).unwrap().display_title(), "New");
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut store = SelectionStore::new();
        store.add(Artwork::new(2));

        assert!(!store.remove(99));
        assert_eq!(store.len(), 1);
        assert!(store.remove(2));
        assert!(store.is_empty());
    }

    #[test]
    fn test_net_effect_of_operation_sequence() {
        let mut store = SelectionStore::new();
        let ops: &[(bool, u64)] = &[
            (true, 1),
            (true, 2),
            (false, 1),
            (true, 3),
            (true, 1),
            (false, 2),
            (false, 2),
            (true, 4),
            (false, 4),
        ];

        for &(add, id) in ops {
            if add {
                store.add(Artwork::new(id));
            } else {
                store.remove(id);
            }
        }

        assert!(store.has(1));
        assert!(!store.has(2));
        assert!(store.has(3));
        assert!(!store.has(4));
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_values_are_ordered_by_id() {
        let mut store = SelectionStore::new();
        store.extend([Artwork::new(30), Artwork::new(4), Artwork::new(17)]);

        let ids: Vec<u64> = store.values().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![4, 17, 30]);
    }

    #[test]
    fn test_clear() {
        let mut store = SelectionStore::new();
        store.extend((1..=5).map(Artwork::new));
        store.clear();

        assert!(store.is_empty());
        assert!(!store.has(3));
    }
}
