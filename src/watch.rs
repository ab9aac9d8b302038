//! Live mode: keep the HTML dashboard in step with the relay.
//!
//! Each snapshot publication re-derives the whole view. The query file is
//! checked on its own tick at the message cadence, so an edit applies even
//! while the relay is down. The page on disk is rewritten only when it
//! changed.

use crate::Result;
use crate::backend::Backend;
use crate::dashboard::Dashboard;
use crate::query::Query;
use crate::query::parse::load_query_file;
use crate::render::render_dashboard_html;
use crate::sync::{Cadence, Synchronizer};

use anyhow::Context;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

/// Picks up edits of a query file. Detection is by content, so editors that
/// keep the modification time still trigger a reload.
#[derive(Debug)]
pub struct QueryFileWatch {
    path: PathBuf,
    last_text: Option<String>,
}

impl QueryFileWatch {
    /// `initial` is the text the current query was loaded from.
    pub fn new(path: PathBuf, initial: Option<String>) -> Self {
        Self {
            path,
            last_text: initial,
        }
    }

    /// Returns the new query when the file changed and parses. A broken edit
    /// is reported once and otherwise ignored.
    pub async fn poll(&mut self) -> Option<Query> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), %err, "query file unreadable");
                return None;
            }
        };
        if self.last_text.as_deref() == Some(text.as_str()) {
            return None;
        }

        let parsed = serde_json::from_str::<Query>(&text);
        self.last_text = Some(text);
        match parsed {
            Ok(query) => Some(query),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "ignoring malformed query file edit");
                None
            }
        }
    }
}

/// Load the startup query from a file and return a watcher primed with it.
pub fn open_query_file(path: &Path) -> Result<(Query, QueryFileWatch)> {
    let query = load_query_file(path)?;
    let text = fs::read_to_string(path).ok();
    Ok((query, QueryFileWatch::new(path.to_path_buf(), text)))
}

pub struct WatchOptions {
    pub out: PathBuf,
    pub query_file: Option<QueryFileWatch>,
}

/// Run until `shutdown` resolves.
pub async fn run<B, S>(
    backend: Arc<B>,
    cadence: Cadence,
    mut dashboard: Dashboard,
    options: WatchOptions,
    shutdown: S,
) -> Result<()>
where
    B: Backend,
    S: Future<Output = ()>,
{
    let WatchOptions {
        out,
        mut query_file,
    } = options;

    let (sync, mut feeds) = Synchronizer::start(backend, cadence);
    let mut last_page = String::new();
    let mut query_tick = tokio::time::interval(cadence.messages);
    query_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = feeds.messages.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = Arc::clone(&feeds.messages.borrow_and_update());
                dashboard.publish_messages(snapshot);
            }
            changed = feeds.nodes.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = Arc::clone(&feeds.nodes.borrow_and_update());
                dashboard.publish_nodes(snapshot);
            }
            _ = query_tick.tick() => {
                if let Some(watch) = query_file.as_mut() {
                    if let Some(query) = watch.poll().await {
                        if dashboard.set_query(query) {
                            tracing::info!(query = ?dashboard.query(), "query replaced");
                        }
                    }
                }
            }
            _ = &mut shutdown => {
                tracing::info!("shutting down");
                break;
            }
        }

        let view = dashboard.view();
        let page = render_dashboard_html(&view)?;
        if page != last_page {
            tokio::fs::write(&out, &page)
                .await
                .with_context(|| format!("write {}", out.display()))?;
            tracing::info!(
                matches = view.messages.rows.len(),
                nodes = view.nodes.rows.len(),
                out = %out.display(),
                "dashboard updated"
            );
            last_page = page;
        }
    }

    sync.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::OutgoingMessage;
    use crate::query::{FilterToken, Operator, PropertyKey};
    use crate::record::{MessageRecord, NodeRecord};
    use std::time::Duration;

    struct StaticBackend;

    impl Backend for StaticBackend {
        fn fetch_messages(&self) -> Result<Vec<MessageRecord>> {
            Ok(vec![
                MessageRecord {
                    source: "!a".into(),
                    portnum: "TEXT_MESSAGE_APP".into(),
                    ..MessageRecord::default()
                },
                MessageRecord {
                    source: "!b".into(),
                    portnum: "ROUTING_APP".into(),
                    ..MessageRecord::default()
                },
            ])
        }

        fn fetch_nodes(&self) -> Result<Vec<NodeRecord>> {
            Ok(vec![NodeRecord {
                node_id: "!a".into(),
                ..NodeRecord::default()
            }])
        }

        fn send_message(&self, _outgoing: &OutgoingMessage) -> Result<()> {
            Ok(())
        }
    }

    struct DownBackend;

    impl Backend for DownBackend {
        fn fetch_messages(&self) -> Result<Vec<MessageRecord>> {
            anyhow::bail!("relay unreachable")
        }

        fn fetch_nodes(&self) -> Result<Vec<NodeRecord>> {
            anyhow::bail!("relay unreachable")
        }

        fn send_message(&self, _outgoing: &OutgoingMessage) -> Result<()> {
            anyhow::bail!("relay unreachable")
        }
    }

    async fn wait_for_page(out: &Path, needle: &str) -> String {
        let mut page = String::new();
        for _ in 0..500 {
            page = tokio::fs::read_to_string(out).await.unwrap_or_default();
            if page.contains(needle) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        page
    }

    #[tokio::test]
    async fn query_file_reload_is_content_based() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("query.json");
        fs::write(&path, r#"{"operation":"and","tokens":[]}"#).unwrap();

        let (query, mut watch) = open_query_file(&path).unwrap();
        assert_eq!(query, Query::and(vec![]));
        assert_eq!(watch.poll().await, None);

        fs::write(&path, r#"{"operation":"or","tokens":[]}"#).unwrap();
        assert_eq!(watch.poll().await, Some(Query::or(vec![])));
        assert_eq!(watch.poll().await, None);

        fs::write(&path, r#"{"operation":"or","tokens":["#).unwrap();
        assert_eq!(watch.poll().await, None);

        fs::write(
            &path,
            r#"{"operation":"and","tokens":[{"propertyKey":"source","operator":"=","value":"!b"}]}"#,
        )
        .unwrap();
        assert_eq!(
            watch.poll().await,
            Some(Query::and(vec![FilterToken::new(PropertyKey::Source, Operator::Equals, "!b")]))
        );
    }

    #[tokio::test]
    async fn query_file_edit_applies_while_relay_is_down() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dashboard.html");
        let query_path = dir.path().join("query.json");
        fs::write(&query_path, r#"{"operation":"and","tokens":[]}"#).unwrap();
        let (query, query_file) = open_query_file(&query_path).unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let task = tokio::spawn(run(
            Arc::new(DownBackend),
            Cadence {
                messages: Duration::from_millis(10),
                nodes: Duration::from_millis(10),
            },
            Dashboard::new(query),
            WatchOptions {
                out: out.clone(),
                query_file: Some(query_file),
            },
            async move {
                let _ = stop_rx.await;
            },
        ));

        let page = wait_for_page(&out, r#""query":{"mode":"and","tokens":[]}"#).await;
        assert!(page.contains(r#""count_text":"0 matches""#), "{page}");

        fs::write(
            &query_path,
            r#"{"operation":"or","tokens":[{"propertyKey":"source","operator":"=","value":"!zz"}]}"#,
        )
        .unwrap();
        let page = wait_for_page(&out, r#""tokens":["source = !zz"]"#).await;
        assert!(page.contains(r#""query":{"mode":"or","tokens":["source = !zz"]}"#), "{page}");

        stop_tx.send(()).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn writes_page_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("dashboard.html");
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let task = tokio::spawn(run(
            Arc::new(StaticBackend),
            Cadence {
                messages: Duration::from_millis(10),
                nodes: Duration::from_millis(10),
            },
            Dashboard::new(Query::default()),
            WatchOptions {
                out: out.clone(),
                query_file: None,
            },
            async move {
                let _ = stop_rx.await;
            },
        ));

        let page = wait_for_page(&out, r#""count_text":"1 matches""#).await;
        assert!(page.contains(r#""count_text":"1 matches""#), "{page}");

        stop_tx.send(()).unwrap();
        task.await.unwrap().unwrap();
    }
}
