//! Keep node model.
//!
//! Everything in Keep is a node: notes, lists, list items, attachments. Only
//! the fields the mover reads or writes are typed; the rest is carried in
//! `extra` so nodes survive a round trip to the service untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const NODE_KIND: &str = "notes#node";
pub const TIMESTAMPS_KIND: &str = "notes#timestamps";
pub const TYPE_LIST: &str = "LIST";
pub const TYPE_LIST_ITEM: &str = "LIST_ITEM";

/// Gap left between sort values when placing a new item.
pub const SORT_DELTA: i64 = 10_000;

/// The service's spelling of "never".
pub const EPOCH: &str = "1970-01-01T00:00:00.000Z";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub parent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_server_id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default, deserialize_with = "sort_value")]
    pub sort_value: i64,
    #[serde(default)]
    pub timestamps: Timestamps,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trashed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_edited: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// A fresh, unchecked list item under `parent`.
    #[must_use]
    pub fn new_list_item(parent: &Self, text: &str, sort_value: i64, now: DateTime<Utc>) -> Self {
        let stamp = format_timestamp(now);
        let mut extra = Map::new();
        extra.insert("kind".to_string(), Value::String(NODE_KIND.to_string()));

        let mut ts_extra = Map::new();
        ts_extra.insert(
            "kind".to_string(),
            Value::String(TIMESTAMPS_KIND.to_string()),
        );

        Self {
            id: generate_id(now),
            node_type: TYPE_LIST_ITEM.to_string(),
            parent_id: parent.id.clone(),
            server_id: None,
            parent_server_id: parent.server_id.clone(),
            title: String::new(),
            text: text.to_string(),
            checked: false,
            sort_value,
            timestamps: Timestamps {
                created: Some(stamp.clone()),
                updated: Some(stamp.clone()),
                trashed: Some(EPOCH.to_string()),
                deleted: Some(EPOCH.to_string()),
                user_edited: Some(stamp),
                extra: ts_extra,
            },
            extra,
        }
    }

    #[must_use]
    pub fn is_list(&self) -> bool {
        self.node_type == TYPE_LIST
    }

    #[must_use]
    pub fn is_list_item(&self) -> bool {
        self.node_type == TYPE_LIST_ITEM
    }

    /// Deleted or in the trash.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        is_set(self.timestamps.deleted.as_deref()) || is_set(self.timestamps.trashed.as_deref())
    }

    /// Mark the node deleted as of `now`.
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        let stamp = format_timestamp(now);
        self.timestamps.deleted = Some(stamp.clone());
        self.timestamps.updated = Some(stamp);
    }
}

fn is_set(stamp: Option<&str>) -> bool {
    stamp.is_some_and(|s| !s.is_empty() && !s.starts_with("1970-01-01"))
}

#[must_use]
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Client-side node id: hex milliseconds, a dot, 64 random bits.
#[must_use]
pub fn generate_id(now: DateTime<Utc>) -> String {
    let (random, _) = uuid::Uuid::new_v4().as_u64_pair();
    format!("{:x}.{random:016x}", now.timestamp_millis())
}

// The service sends sort values as either numbers or numeric strings.
fn sort_value<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Str(String),
    }

    #[allow(clippy::cast_possible_truncation)]
    match Raw::deserialize(deserializer)? {
        Raw::Int(v) => Ok(v),
        Raw::Float(v) => Ok(v as i64),
        Raw::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list_node() -> Node {
        serde_json::from_value(json!({
            "id": "list.1",
            "serverId": "srv-1",
            "kind": "notes#node",
            "type": "LIST",
            "parentId": "root",
            "title": "Shopping",
            "sortValue": "42",
            "color": "DEFAULT",
            "timestamps": {
                "kind": "notes#timestamps",
                "created": "2024-01-01T00:00:00.000Z",
                "trashed": "1970-01-01T00:00:00.000Z"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_keeps_unknown_fields() {
        let node = list_node();
        assert!(node.is_list());
        assert_eq!(node.sort_value, 42);
        assert!(!node.is_removed());

        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["color"], "DEFAULT");
        assert_eq!(back["kind"], "notes#node");
        assert_eq!(back["timestamps"]["kind"], "notes#timestamps");
    }

    #[test]
    fn test_new_list_item_links_to_parent() {
        let parent = list_node();
        let now = Utc::now();
        let item = Node::new_list_item(&parent, "milk", 100, now);

        assert!(item.is_list_item());
        assert_eq!(item.parent_id, "list.1");
        assert_eq!(item.parent_server_id.as_deref(), Some("srv-1"));
        assert!(!item.checked);
        assert!(!item.is_removed());
        assert!(item.id.contains('.'));
    }

    #[test]
    fn test_mark_deleted() {
        let mut node = list_node();
        node.mark_deleted(Utc::now());
        assert!(node.is_removed());
    }

    #[test]
    fn test_trashed_counts_as_removed() {
        let mut node = list_node();
        node.timestamps.trashed = Some("2024-03-01T10:00:00.000Z".to_string());
        assert!(node.is_removed());
    }
}
