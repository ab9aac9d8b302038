//! Destination suggestions derived from the node snapshot.

use crate::record::NodeRecord;

use std::collections::HashSet;

/// Reserved destination that addresses every node on the mesh.
pub const BROADCAST_ID: &str = "^all";

/// Known node ids in snapshot order, deduplicated, followed by the synthetic
/// broadcast id as the final entry.
pub fn node_id_suggestions(nodes: &[NodeRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut ids: Vec<String> = nodes
        .iter()
        .map(|n| n.node_id.as_str())
        .filter(|id| !id.is_empty() && *id != BROADCAST_ID)
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect();
    ids.push(BROADCAST_ID.to_string());
    ids
}
