//! Note-store capability.
//!
//! The polling loop only ever talks to a [`NoteStore`]. [`keep::KeepStore`]
//! adapts the Google Keep service; [`memory::MemoryStore`] is a local,
//! in-process store used by tests.

pub mod keep;
pub mod memory;

use async_trait::async_trait;

use crate::error::MoverError;
use crate::secrets::Secret;

pub use keep::{KeepConnector, KeepStore};
pub use memory::MemoryStore;

/// A checklist in the note store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListHandle {
    pub id: String,
    pub title: String,
}

/// One entry of a checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub list_id: String,
    pub text: String,
    pub checked: bool,
}

/// Operations the sync loop needs from a note service.
///
/// Mutations are applied to local state immediately and reach the service on
/// the next [`NoteStore::refresh`].
#[async_trait]
pub trait NoteStore: Send {
    /// Push local changes and pull remote ones.
    ///
    /// # Errors
    ///
    /// Returns `MoverError::Network` for failures worth retrying.
    async fn refresh(&mut self) -> Result<(), MoverError>;

    /// Resolve a list title to exactly one list.
    ///
    /// A single exact title match wins. Otherwise a single list whose title
    /// contains `name` is accepted. Several candidates at either level
    /// resolve to `None`.
    fn find_list_by_name(&self, name: &str) -> Option<ListHandle>;

    /// Checked items of `list`, in list order.
    fn list_checked_items(&self, list: &ListHandle) -> Vec<Item>;

    /// Remove `item` from its list.
    ///
    /// # Errors
    ///
    /// Returns `MoverError::NotFound` if the item no longer exists.
    fn delete_item(&mut self, item: &Item) -> Result<(), MoverError>;

    /// Add an unchecked item with `text` above every existing item of `list`.
    ///
    /// # Errors
    ///
    /// Returns `MoverError::NotFound` if the list no longer exists.
    fn insert_item_at_top(&mut self, list: &ListHandle, text: &str) -> Result<Item, MoverError>;

    /// Serialize everything needed to resume without a full fetch.
    ///
    /// # Errors
    ///
    /// Returns `MoverError::Parse` if serialization fails.
    fn serialize_state(&self) -> Result<Vec<u8>, MoverError>;

    /// Replace local state with a previous [`NoteStore::serialize_state`] dump.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is not a dump this store understands; the
    /// store is left empty in that case.
    fn restore_state(&mut self, bytes: &[u8]) -> Result<(), MoverError>;
}

/// Authenticates against a note service and hands out an empty store.
#[async_trait]
pub trait Connector: Send + Sync {
    type Store: NoteStore;

    /// # Errors
    ///
    /// Returns `MoverError::Authentication` if the service rejects the
    /// credentials.
    async fn connect(&self, username: &str, secret: &Secret) -> Result<Self::Store, MoverError>;
}

/// Pick exactly one list for `name` out of `(id, title)` candidates.
///
/// Shared by the store implementations so they resolve names identically.
pub(crate) fn resolve_list<'a, I>(name: &str, lists: I) -> Option<ListHandle>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    if name.is_empty() {
        return None;
    }

    let mut exact: Vec<(&str, &str)> = Vec::new();
    let mut partial: Vec<(&str, &str)> = Vec::new();
    for (id, title) in lists {
        if title == name {
            exact.push((id, title));
        } else if title.contains(name) {
            partial.push((id, title));
        }
    }

    let candidates = if exact.is_empty() { partial } else { exact };
    match candidates.as_slice() {
        [(id, title)] => Some(ListHandle {
            id: (*id).to_string(),
            title: (*title).to_string(),
        }),
        _ => None,
    }
}
