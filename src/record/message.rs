use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One entry of the relay's message history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub source: String,

    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub destination: String,

    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub message: String,

    /// Signal-to-noise ratio in dB; absent for locally originated packets.
    #[serde(default)]
    pub snr: Option<f64>,

    #[serde(default)]
    pub rssi: Option<i64>,

    /// Application port, e.g. `TEXT_MESSAGE_APP`. Open set.
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub portnum: String,
}

/// Latest published message history.
pub type MessageSnapshot = Arc<Vec<MessageRecord>>;
