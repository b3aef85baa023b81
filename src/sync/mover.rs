//! Moving ticked items for one list set.
//!
//! Items are deleted from the low priority list before they are added to
//! the primary list. If adding fails the items are gone rather than
//! duplicated. Each item is inserted at the top, so the primary list shows
//! them in the reverse of the order they were scanned.

use crate::config::ListSet;
use crate::error::{ListRole, MoverError, ValidationError};
use crate::store::{ListHandle, NoteStore};

/// What happened to one list set during a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveReport {
    pub primary: String,
    pub secondary: String,
    /// Texts moved, in scan order.
    pub moved: Vec<String>,
    /// Ticked items removed from the primary list.
    pub purged: usize,
}

impl MoveReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moved.is_empty() && self.purged == 0
    }
}

/// A list set whose names have been resolved against the store.
#[derive(Debug, Clone)]
pub struct ResolvedSet {
    pub primary: ListHandle,
    pub secondary: ListHandle,
}

impl ResolvedSet {
    /// Look up both lists of set number `set` (1-based).
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ListNotFound` if either list is gone.
    pub fn resolve(
        store: &dyn NoteStore,
        set: usize,
        list_set: &ListSet,
    ) -> Result<Self, MoverError> {
        let lookup = |role: ListRole, name: &str| {
            store.find_list_by_name(name).ok_or_else(|| ValidationError::ListNotFound {
                set,
                role,
                name: name.to_string(),
            })
        };

        Ok(Self {
            primary: lookup(ListRole::Primary, &list_set.primary_list)?,
            secondary: lookup(ListRole::Secondary, &list_set.secondary_list)?,
        })
    }

    /// Whether [`ResolvedSet::apply`] would change anything.
    #[must_use]
    pub fn has_work(&self, store: &dyn NoteStore, purge_primary: bool) -> bool {
        !store.list_checked_items(&self.secondary).is_empty()
            || (purge_primary && !store.list_checked_items(&self.primary).is_empty())
    }

    /// Move every ticked item from the secondary list to the top of the
    /// primary list, unticked.
    ///
    /// # Errors
    ///
    /// Returns the first store error; items already deleted stay deleted.
    pub fn apply(
        &self,
        store: &mut dyn NoteStore,
        purge_primary: bool,
    ) -> Result<MoveReport, MoverError> {
        let mut report = MoveReport {
            primary: self.primary.title.clone(),
            secondary: self.secondary.title.clone(),
            ..MoveReport::default()
        };

        if purge_primary {
            for item in store.list_checked_items(&self.primary) {
                store.delete_item(&item)?;
                report.purged += 1;
            }
        }

        let candidates = store.list_checked_items(&self.secondary);
        for item in &candidates {
            store.delete_item(item)?;
        }
        for item in candidates {
            store.insert_item_at_top(&self.primary, &item.text)?;
            report.moved.push(item.text);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn texts(store: &MemoryStore, list: &ListHandle) -> Vec<(String, bool)> {
        store
            .items(list)
            .into_iter()
            .map(|i| (i.text, i.checked))
            .collect()
    }

    fn shopping() -> (MemoryStore, ListHandle, ListHandle) {
        let mut store = MemoryStore::new();
        let primary = store.add_list("Shopping");
        let secondary = store.add_list("Shopping (low priority)");
        (store, primary, secondary)
    }

    fn resolved(store: &MemoryStore) -> ResolvedSet {
        ResolvedSet::resolve(store, 1, &ListSet::new("Shopping", "Shopping (low priority)")).unwrap()
    }

    #[test]
    fn test_moved_items_end_up_in_reverse_scan_order() {
        let (mut store, primary, secondary) = shopping();
        store.add_item(&secondary, "A", true).unwrap();
        store.add_item(&secondary, "B", true).unwrap();
        store.add_item(&secondary, "C", true).unwrap();

        let report = resolved(&store).apply(&mut store, false).unwrap();

        assert_eq!(report.moved, ["A", "B", "C"]);
        assert_eq!(
            texts(&store, &primary),
            [
                ("C".to_string(), false),
                ("B".to_string(), false),
                ("A".to_string(), false)
            ]
        );
        assert!(store.items(&secondary).is_empty());
    }

    #[test]
    fn test_unchecked_items_stay_put() {
        let (mut store, primary, secondary) = shopping();
        store.add_item(&primary, "milk", false).unwrap();
        store.add_item(&secondary, "bread", false).unwrap();
        store.add_item(&secondary, "jam", true).unwrap();

        resolved(&store).apply(&mut store, false).unwrap();

        assert_eq!(
            texts(&store, &primary),
            [("jam".to_string(), false), ("milk".to_string(), false)]
        );
        assert_eq!(texts(&store, &secondary), [("bread".to_string(), false)]);
    }

    #[test]
    fn test_nothing_checked_is_a_no_op() {
        let (mut store, primary, secondary) = shopping();
        store.add_item(&primary, "milk", true).unwrap();
        store.add_item(&secondary, "bread", false).unwrap();

        let set = resolved(&store);
        assert!(!set.has_work(&store, false));
        let report = set.apply(&mut store, false).unwrap();

        assert!(report.is_empty());
        assert_eq!(texts(&store, &primary), [("milk".to_string(), true)]);
    }

    #[test]
    fn test_purge_removes_ticked_primary_items() {
        let (mut store, primary, secondary) = shopping();
        store.add_item(&primary, "milk", true).unwrap();
        store.add_item(&primary, "eggs", false).unwrap();
        store.add_item(&secondary, "jam", true).unwrap();

        let set = resolved(&store);
        assert!(set.has_work(&store, true));
        let report = set.apply(&mut store, true).unwrap();

        assert_eq!(report.purged, 1);
        assert_eq!(
            texts(&store, &primary),
            [("jam".to_string(), false), ("eggs".to_string(), false)]
        );
    }

    #[test]
    fn test_missing_list_reports_role_and_name() {
        let (store, _, _) = shopping();
        let err = ResolvedSet::resolve(&store, 3, &ListSet::new("Shopping", "Gone")).unwrap_err();

        assert!(matches!(
            err,
            MoverError::Validation(ValidationError::ListNotFound { set: 3, role: ListRole::Secondary, ref name })
                if name == "Gone"
        ));
    }
}
