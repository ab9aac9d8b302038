use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Status of one node heard by the relay. `node_id` is the lookup key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub node_id: String,

    #[serde(default)]
    pub node_name: Option<String>,

    #[serde(default)]
    pub node_short_name: Option<String>,

    /// Percent.
    #[serde(default)]
    pub battery_level: Option<i64>,

    #[serde(default)]
    pub voltage: Option<f64>,

    #[serde(default)]
    pub last_heard: Option<String>,

    #[serde(default)]
    pub snr: Option<f64>,
}

/// Latest published node list.
pub type NodeSnapshot = Arc<Vec<NodeRecord>>;
