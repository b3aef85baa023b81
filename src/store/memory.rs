//! In-process note store.
//!
//! Holds lists and items in memory. Used by tests and as a reference for how
//! a [`NoteStore`] is expected to behave.

use std::cell::Cell;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{resolve_list, Item, ListHandle, NoteStore};
use crate::error::MoverError;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredItem {
    id: String,
    text: String,
    checked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredList {
    id: String,
    title: String,
    /// Top to bottom.
    items: Vec<StoredItem>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct State {
    lists: Vec<StoredList>,
    next_id: u64,
}

/// Note store that lives entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: State,
    refreshes: usize,
    failing_refreshes: usize,
    lookups: Cell<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty list.
    pub fn add_list(&mut self, title: &str) -> ListHandle {
        let id = self.next_id("list");
        self.state.lists.push(StoredList {
            id: id.clone(),
            title: title.to_string(),
            items: Vec::new(),
        });
        ListHandle {
            id,
            title: title.to_string(),
        }
    }

    /// Append an item at the bottom of `list`.
    ///
    /// # Errors
    ///
    /// Returns `MoverError::NotFound` if the list does not exist.
    pub fn add_item(&mut self, list: &ListHandle, text: &str, checked: bool) -> Result<Item, MoverError> {
        let id = self.next_id("item");
        let stored = self.list_mut(&list.id)?;
        stored.items.push(StoredItem {
            id: id.clone(),
            text: text.to_string(),
            checked,
        });
        Ok(Item {
            id,
            list_id: list.id.clone(),
            text: text.to_string(),
            checked,
        })
    }

    /// All items of `list`, top to bottom.
    #[must_use]
    pub fn items(&self, list: &ListHandle) -> Vec<Item> {
        self.state
            .lists
            .iter()
            .find(|l| l.id == list.id)
            .map(|l| l.items.iter().map(|i| to_item(&l.id, i)).collect())
            .unwrap_or_default()
    }

    /// Make the next `count` refreshes fail with a network error.
    pub fn fail_next_refreshes(&mut self, count: usize) {
        self.failing_refreshes = count;
    }

    /// Number of refresh attempts so far, failed ones included.
    #[must_use]
    pub const fn refresh_count(&self) -> usize {
        self.refreshes
    }

    /// Number of name lookups so far.
    #[must_use]
    pub fn lookup_count(&self) -> usize {
        self.lookups.get()
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.state.next_id += 1;
        format!("{prefix}-{}", self.state.next_id)
    }

    fn list_mut(&mut self, id: &str) -> Result<&mut StoredList, MoverError> {
        self.state
            .lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| MoverError::NotFound(format!("list {id}")))
    }
}

fn to_item(list_id: &str, item: &StoredItem) -> Item {
    Item {
        id: item.id.clone(),
        list_id: list_id.to_string(),
        text: item.text.clone(),
        checked: item.checked,
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn refresh(&mut self) -> Result<(), MoverError> {
        self.refreshes += 1;
        if self.failing_refreshes > 0 {
            self.failing_refreshes -= 1;
            return Err(MoverError::Network("simulated connection reset".to_string()));
        }
        Ok(())
    }

    fn find_list_by_name(&self, name: &str) -> Option<ListHandle> {
        self.lookups.set(self.lookups.get() + 1);
        resolve_list(
            name,
            self.state
                .lists
                .iter()
                .map(|l| (l.id.as_str(), l.title.as_str())),
        )
    }

    fn list_checked_items(&self, list: &ListHandle) -> Vec<Item> {
        self.items(list).into_iter().filter(|i| i.checked).collect()
    }

    fn delete_item(&mut self, item: &Item) -> Result<(), MoverError> {
        let list = self.list_mut(&item.list_id)?;
        let before = list.items.len();
        list.items.retain(|i| i.id != item.id);
        if list.items.len() == before {
            return Err(MoverError::NotFound(format!("item {}", item.id)));
        }
        Ok(())
    }

    fn insert_item_at_top(&mut self, list: &ListHandle, text: &str) -> Result<Item, MoverError> {
        let id = self.next_id("item");
        let stored = self.list_mut(&list.id)?;
        let new_item = StoredItem {
            id,
            text: text.to_string(),
            checked: false,
        };
        let item = to_item(&stored.id, &new_item);
        stored.items.insert(0, new_item);
        Ok(item)
    }

    fn serialize_state(&self) -> Result<Vec<u8>, MoverError> {
        Ok(serde_json::to_vec(&self.state)?)
    }

    fn restore_state(&mut self, bytes: &[u8]) -> Result<(), MoverError> {
        match serde_json::from_slice(bytes) {
            Ok(state) => {
                self.state = state;
                Ok(())
            },
            Err(e) => {
                self.state = State::default();
                Err(e.into())
            },
        }
    }
}
