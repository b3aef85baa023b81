//! Google Keep adapter for [`NoteStore`].
//!
//! Keeps a local copy of every node, tracks which ones were changed locally,
//! and reconciles both directions through the `changes` endpoint on
//! [`NoteStore::refresh`].

pub mod api;
pub mod node;

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{resolve_list, Connector, Item, ListHandle, NoteStore};
use crate::error::MoverError;
use crate::secrets::Secret;

pub use api::{Endpoints, KeepApi};
pub use node::Node;

use node::SORT_DELTA;

/// Serialized form written to the snapshot file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Dump {
    keep_version: Option<String>,
    nodes: Vec<Node>,
    #[serde(default)]
    dirty: Vec<String>,
}

/// Local mirror of a Keep account.
pub struct KeepStore {
    api: KeepApi,
    nodes: BTreeMap<String, Node>,
    keep_version: Option<String>,
    dirty: BTreeSet<String>,
}

impl KeepStore {
    #[must_use]
    pub fn new(api: KeepApi) -> Self {
        Self {
            api,
            nodes: BTreeMap::new(),
            keep_version: None,
            dirty: BTreeSet::new(),
        }
    }

    /// Number of local changes not yet sent to the service.
    #[must_use]
    pub fn pending_changes(&self) -> usize {
        self.dirty.len()
    }

    fn live_lists(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.is_list() && !n.is_removed())
    }

    fn live_items<'a>(&'a self, list_id: &'a str) -> impl Iterator<Item = &'a Node> {
        self.nodes
            .values()
            .filter(move |n| n.is_list_item() && n.parent_id == list_id && !n.is_removed())
    }

    fn apply(&mut self, incoming: Vec<Node>) {
        for node in incoming {
            if node.is_removed() {
                self.nodes.remove(&node.id);
            } else {
                self.nodes.insert(node.id.clone(), node);
            }
        }
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.keep_version = None;
        self.dirty.clear();
    }
}

fn to_item(node: &Node) -> Item {
    Item {
        id: node.id.clone(),
        list_id: node.parent_id.clone(),
        text: node.text.clone(),
        checked: node.checked,
    }
}

#[async_trait]
impl NoteStore for KeepStore {
    async fn refresh(&mut self) -> Result<(), MoverError> {
        let mut outgoing: Vec<Node> = self
            .dirty
            .iter()
            .filter_map(|id| self.nodes.get(id).cloned())
            .collect();
        let mut resynced = false;

        loop {
            let page = self
                .api
                .changes(&outgoing, self.keep_version.as_deref())
                .await?;

            if !outgoing.is_empty() {
                for sent in outgoing.drain(..) {
                    self.dirty.remove(&sent.id);
                    if sent.is_removed() {
                        self.nodes.remove(&sent.id);
                    }
                }
            }

            if page.force_full_resync {
                if resynced {
                    return Err(MoverError::Remote(
                        "service requested a full resync twice in one refresh".to_string(),
                    ));
                }
                tracing::warn!("service requested a full resync, dropping local state");
                self.reset();
                resynced = true;
                continue;
            }

            let received = page.nodes.len();
            self.apply(page.nodes);
            if page.to_version.is_some() {
                self.keep_version = page.to_version;
            }
            tracing::debug!(received, version = ?self.keep_version, "applied changes page");

            if !page.truncated {
                break;
            }
        }

        Ok(())
    }

    fn find_list_by_name(&self, name: &str) -> Option<ListHandle> {
        resolve_list(
            name,
            self.live_lists().map(|n| (n.id.as_str(), n.title.as_str())),
        )
    }

    fn list_checked_items(&self, list: &ListHandle) -> Vec<Item> {
        let mut items: Vec<&Node> = self.live_items(&list.id).filter(|n| n.checked).collect();
        // Higher sort values sit nearer the top.
        items.sort_by(|a, b| b.sort_value.cmp(&a.sort_value));
        items.into_iter().map(to_item).collect()
    }

    fn delete_item(&mut self, item: &Item) -> Result<(), MoverError> {
        let node = self
            .nodes
            .get_mut(&item.id)
            .filter(|n| !n.is_removed())
            .ok_or_else(|| MoverError::NotFound(format!("list item {:?}", item.text)))?;
        node.mark_deleted(Utc::now());
        self.dirty.insert(item.id.clone());
        Ok(())
    }

    fn insert_item_at_top(&mut self, list: &ListHandle, text: &str) -> Result<Item, MoverError> {
        let parent = self
            .nodes
            .get(&list.id)
            .filter(|n| n.is_list() && !n.is_removed())
            .ok_or_else(|| MoverError::NotFound(format!("list {:?}", list.title)))?;

        let sort_value = self
            .live_items(&list.id)
            .map(|n| n.sort_value)
            .max()
            .unwrap_or(0)
            + SORT_DELTA;

        let node = Node::new_list_item(parent, text, sort_value, Utc::now());
        let item = to_item(&node);
        self.dirty.insert(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        Ok(item)
    }

    fn serialize_state(&self) -> Result<Vec<u8>, MoverError> {
        let dump = Dump {
            keep_version: self.keep_version.clone(),
            nodes: self.nodes.values().cloned().collect(),
            dirty: self.dirty.iter().cloned().collect(),
        };
        Ok(serde_json::to_vec(&dump)?)
    }

    fn restore_state(&mut self, bytes: &[u8]) -> Result<(), MoverError> {
        self.reset();
        let dump: Dump = serde_json::from_slice(bytes)?;
        self.nodes = dump
            .nodes
            .into_iter()
            .map(|n| (n.id.clone(), n))
            .collect();
        self.dirty = dump
            .dirty
            .into_iter()
            .filter(|id| self.nodes.contains_key(id))
            .collect();
        self.keep_version = dump.keep_version;
        Ok(())
    }
}

/// Upper bound on a single HTTP request, body included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound on establishing a connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Logs in to Google Keep with a master token.
#[derive(Debug, Clone)]
pub struct KeepConnector {
    endpoints: Endpoints,
    request_timeout: Duration,
    connect_timeout: Duration,
}

impl KeepConnector {
    #[must_use]
    pub fn new() -> Self {
        Self::with_endpoints(Endpoints::default())
    }

    /// Talk to different endpoints, e.g. a local mock server.
    #[must_use]
    pub fn with_endpoints(endpoints: Endpoints) -> Self {
        Self {
            endpoints,
            request_timeout: REQUEST_TIMEOUT,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }

    /// Replace the per-request timeout. A request that takes longer fails
    /// with `MoverError::Network`.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn build_http_client(&self) -> Result<reqwest::Client, MoverError> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|e| MoverError::Config(format!("Failed to build HTTP client: {e}")))
    }
}

impl Default for KeepConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for KeepConnector {
    type Store = KeepStore;

    async fn connect(&self, username: &str, secret: &Secret) -> Result<KeepStore, MoverError> {
        let http = self.build_http_client()?;
        let api = KeepApi::login(http, self.endpoints.clone(), username, secret).await?;
        tracing::info!(username, "authenticated with Google Keep");
        Ok(KeepStore::new(api))
    }
}
