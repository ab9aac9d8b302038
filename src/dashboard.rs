//! Dashboard state: the latest published snapshots plus the current query.
//!
//! Every input is replaced whole (`publish_*`, `set_query`), and `view`
//! re-derives the entire presentation from scratch. Nothing derived is
//! cached between calls.

use crate::node_index::node_id_suggestions;
use crate::query::{Query, evaluate};
use crate::record::{MessageRecord, MessageSnapshot, NodeRecord, NodeSnapshot};
use crate::view::{
    DashboardView, MessageColumn, MessageRow, MessageTableView, NodeColumn, NodeRow,
    NodeTableView, QueryView, SortSpec, sort_messages, sort_nodes,
};

pub const TITLE: &str = "Mesh Relay Dashboard";

/// Table ordering chosen by the operator. `None` keeps snapshot order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableSort {
    pub messages: Option<SortSpec<MessageColumn>>,
    pub nodes: Option<SortSpec<NodeColumn>>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    messages: MessageSnapshot,
    nodes: NodeSnapshot,
    query: Query,
    sort: TableSort,
    refresh_secs: Option<u64>,
}

impl Dashboard {
    pub fn new(query: Query) -> Self {
        Self {
            messages: MessageSnapshot::default(),
            nodes: NodeSnapshot::default(),
            query,
            sort: TableSort::default(),
            refresh_secs: None,
        }
    }

    pub fn with_sort(mut self, sort: TableSort) -> Self {
        self.sort = sort;
        self
    }

    /// Ask the browser to reload the page every `secs` seconds.
    pub fn with_refresh(mut self, secs: u64) -> Self {
        self.refresh_secs = Some(secs);
        self
    }

    pub fn publish_messages(&mut self, snapshot: MessageSnapshot) {
        self.messages = snapshot;
    }

    pub fn publish_nodes(&mut self, snapshot: NodeSnapshot) {
        self.nodes = snapshot;
    }

    /// Replace the query. Returns false when it is identical to the current one.
    pub fn set_query(&mut self, query: Query) -> bool {
        if self.query == query {
            return false;
        }
        self.query = query;
        true
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn view(&self) -> DashboardView {
        let filtered = evaluate(&self.messages, &self.query);

        let mut messages: Vec<&MessageRecord> = filtered.iter().collect();
        if let Some(spec) = self.sort.messages {
            sort_messages(&mut messages, spec);
        }

        let mut nodes: Vec<&NodeRecord> = self.nodes.iter().collect();
        if let Some(spec) = self.sort.nodes {
            sort_nodes(&mut nodes, spec);
        }

        DashboardView {
            title: TITLE.to_string(),
            query: QueryView::from(&self.query),
            messages: MessageTableView {
                header: "Message History".to_string(),
                count_text: filtered.count_text(),
                empty_text: "No messages to display.".to_string(),
                rows: messages.into_iter().map(MessageRow::from).collect(),
            },
            nodes: NodeTableView {
                header: "Nodes List".to_string(),
                counter: format!(" ({})", self.nodes.len()),
                empty_text: "No nodes discovered to display.".to_string(),
                rows: nodes.into_iter().map(NodeRow::from).collect(),
            },
            destinations: node_id_suggestions(&self.nodes),
            refresh_secs: self.refresh_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FilterToken, Operator, PropertyKey};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn msg(source: &str, portnum: &str, rssi: Option<i64>) -> MessageRecord {
        MessageRecord {
            source: source.into(),
            destination: "^all".into(),
            message: format!("from {source}"),
            snr: None,
            rssi,
            portnum: portnum.into(),
        }
    }

    fn sources(view: &DashboardView) -> Vec<&str> {
        view.messages.rows.iter().map(|r| r.source.as_str()).collect()
    }

    #[test]
    fn starts_empty_with_default_query() {
        let view = Dashboard::new(Query::default()).view();
        assert_eq!(view.messages.count_text, "0 matches");
        assert_eq!(view.nodes.counter, " (0)");
        assert_eq!(view.destinations, vec!["^all".to_string()]);
        assert_eq!(view.query.tokens, vec!["portnum = TEXT_MESSAGE_APP".to_string()]);
    }

    #[test]
    fn recomputes_on_each_replacement() {
        let mut dash = Dashboard::new(Query::default());
        dash.publish_messages(Arc::new(vec![
            msg("!a", "TEXT_MESSAGE_APP", None),
            msg("!b", "ROUTING_APP", None),
        ]));
        assert_eq!(sources(&dash.view()), vec!["!a"]);

        // New snapshot replaces the old one wholesale.
        dash.publish_messages(Arc::new(vec![msg("!c", "TEXT_MESSAGE_APP", None)]));
        assert_eq!(sources(&dash.view()), vec!["!c"]);

        assert!(dash.set_query(Query::and(vec![])));
        assert!(!dash.set_query(Query::and(vec![])));
        assert_eq!(dash.view().messages.count_text, "1 matches");

        assert!(dash.set_query(Query::or(vec![])));
        assert_eq!(dash.view().messages.count_text, "0 matches");
    }

    #[test]
    fn sorting_applies_after_filtering() {
        let mut dash = Dashboard::new(Query::or(vec![FilterToken::new(
            PropertyKey::Portnum,
            Operator::NotEquals,
            "ROUTING_APP",
        )]))
        .with_sort(TableSort {
            messages: Some(SortSpec {
                column: MessageColumn::Rssi,
                descending: true,
            }),
            nodes: None,
        });
        dash.publish_messages(Arc::new(vec![
            msg("!weak", "TEXT_MESSAGE_APP", Some(-110)),
            msg("!routing", "ROUTING_APP", Some(-10)),
            msg("!none", "TELEMETRY_APP", None),
            msg("!strong", "TEXT_MESSAGE_APP", Some(-60)),
        ]));

        let view = dash.view();
        assert_eq!(sources(&view), vec!["!strong", "!weak", "!none"]);
        assert_eq!(view.messages.count_text, "3 matches");
    }

    #[test]
    fn nodes_feed_table_and_destinations() {
        let mut dash = Dashboard::new(Query::default()).with_refresh(2);
        dash.publish_nodes(Arc::new(vec![
            NodeRecord {
                node_id: "!n1".into(),
                node_name: Some("Hilltop".into()),
                ..NodeRecord::default()
            },
            NodeRecord {
                node_id: "!n2".into(),
                ..NodeRecord::default()
            },
        ]));

        let view = dash.view();
        assert_eq!(view.nodes.counter, " (2)");
        assert_eq!(view.nodes.rows[0].node_name, "Hilltop");
        assert_eq!(view.destinations, vec!["!n1", "!n2", "^all"]);
        assert_eq!(view.refresh_secs, Some(2));
    }
}
