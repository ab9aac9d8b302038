//! Record layer: the two collections published by the relay backend.
//!
//! Both record types are plain immutable values. A snapshot is the whole
//! collection as of one refresh; records carry no identity beyond their
//! position in it.

pub mod message;
pub mod node;

pub use message::{MessageRecord, MessageSnapshot};
pub use node::{NodeRecord, NodeSnapshot};

use crate::Result;

use anyhow::Context;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Load a snapshot (a JSON array of records) from a file on disk.
pub fn load_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Arc<Vec<T>>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read snapshot file {}", path.display()))?;
    let records: Vec<T> = serde_json::from_str(&text)
        .with_context(|| format!("parse snapshot file {}", path.display()))?;
    Ok(Arc::new(records))
}

/// Treat `null` the same as a missing field for string columns.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
