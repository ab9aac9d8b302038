//! HTTP client for the relay backend.
//!
//! Endpoints (all JSON):
//! - `GET  {base}/get_nodes`     -> `[NodeRecord]`
//! - `GET  {base}/get_messages`  -> `[MessageRecord]`
//! - `POST {base}/send_message`  <- `{"destination": .., "message": ..}`

use crate::Result;
use crate::config::DashboardConfig;
use crate::record::{MessageRecord, NodeRecord};

use anyhow::{Context, anyhow, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Source of snapshots and sink for outgoing messages.
///
/// Calls are blocking; the synchronizer runs them off the async executor.
pub trait Backend: Send + Sync + 'static {
    fn fetch_messages(&self) -> Result<Vec<MessageRecord>>;
    fn fetch_nodes(&self) -> Result<Vec<NodeRecord>>;
    fn send_message(&self, outgoing: &OutgoingMessage) -> Result<()>;
}

/// Body of a send request. `destination` may be a node id or `^all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMessage {
    pub destination: String,
    pub message: String,
}

impl OutgoingMessage {
    /// Trims the destination and rejects an empty one. Free text is allowed.
    pub fn new(destination: &str, message: impl Into<String>) -> Result<Self> {
        let destination = destination.trim();
        if destination.is_empty() {
            bail!("destination must not be empty (use ^all to broadcast)");
        }
        Ok(Self {
            destination: destination.to_string(),
            message: message.into(),
        })
    }
}

pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(&config.backend_url, config.request_timeout)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        let response = self
            .agent
            .get(&url)
            .set("Content-Type", JSON_CONTENT_TYPE)
            .call()
            .map_err(|err| anyhow!("GET {url} failed: {err}"))?;

        response
            .into_json::<T>()
            .with_context(|| format!("decode JSON response from {url}"))
    }
}

impl Backend for HttpBackend {
    fn fetch_messages(&self) -> Result<Vec<MessageRecord>> {
        self.get_json("get_messages")
    }

    fn fetch_nodes(&self) -> Result<Vec<NodeRecord>> {
        self.get_json("get_nodes")
    }

    fn send_message(&self, outgoing: &OutgoingMessage) -> Result<()> {
        let url = self.endpoint("send_message");
        self.agent
            .post(&url)
            .set("Content-Type", JSON_CONTENT_TYPE)
            .send_json(outgoing)
            .map_err(|err| anyhow!("POST {url} failed: {err}"))?;
        Ok(())
    }
}
