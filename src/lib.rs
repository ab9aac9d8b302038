//! Dashboard for a mesh-radio relay: polls node and message snapshots,
//! narrows the message table with a structured filter query, and renders
//! everything as a self-contained HTML page.

pub mod backend;
pub mod config;
pub mod dashboard;
pub mod diagnostics;
pub mod node_index;
pub mod query;
pub mod record;
pub mod render;
pub mod sync;
pub mod view;
pub mod watch;

pub type Result<T> = anyhow::Result<T>;
