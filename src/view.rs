//! Presentation model: formatted table rows, column sorting, and the
//! serializable view embedded into the HTML page.

use crate::query::{Mode, Query, QueryParseError};
use crate::record::{MessageRecord, NodeRecord};

use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;

pub const MISSING: &str = "N/A";

#[derive(Debug, Clone, Serialize)]
pub struct MessageRow {
    pub source: String,
    pub destination: String,
    pub snr: String,
    pub rssi: String,
    pub portnum: String,
    pub message: String,
}

impl From<&MessageRecord> for MessageRow {
    fn from(r: &MessageRecord) -> Self {
        Self {
            source: r.source.clone(),
            destination: r.destination.clone(),
            snr: r.snr.map_or_else(|| MISSING.to_string(), |snr| format!("{snr}dB")),
            rssi: r.rssi.map_or_else(|| MISSING.to_string(), |rssi| rssi.to_string()),
            portnum: r.portnum.clone(),
            message: r.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeRow {
    pub node_id: String,
    pub node_name: String,
    pub node_short_name: String,
    pub snr: String,
    pub last_heard: String,
    pub battery: String,
    pub voltage: String,
}

impl From<&NodeRecord> for NodeRow {
    fn from(n: &NodeRecord) -> Self {
        Self {
            node_id: n.node_id.clone(),
            node_name: n.node_name.clone().unwrap_or_default(),
            node_short_name: n.node_short_name.clone().unwrap_or_default(),
            snr: n.snr.map_or_else(|| MISSING.to_string(), |snr| snr.to_string()),
            last_heard: n.last_heard.clone().unwrap_or_default(),
            battery: n
                .battery_level
                .map_or_else(|| MISSING.to_string(), |b| format!("{b}%")),
            voltage: n.voltage.map_or_else(|| MISSING.to_string(), |v| format!("{v} V")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageTableView {
    pub header: String,
    pub count_text: String,
    pub empty_text: String,
    pub rows: Vec<MessageRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeTableView {
    pub header: String,
    pub counter: String,
    pub empty_text: String,
    pub rows: Vec<NodeRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryView {
    pub mode: Mode,
    /// Well-formed and inert tokens alike, rendered `property op value`.
    pub tokens: Vec<String>,
}

impl From<&Query> for QueryView {
    fn from(q: &Query) -> Self {
        Self {
            mode: q.mode,
            tokens: q.tokens.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Everything the page needs, embedded as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub query: QueryView,
    pub messages: MessageTableView,
    pub nodes: NodeTableView,
    /// Destination suggestions for the send form, ending with `^all`.
    pub destinations: Vec<String>,
    /// Browser reload period while the dashboard is live.
    pub refresh_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageColumn {
    Source,
    Destination,
    Snr,
    Rssi,
    Portnum,
    Message,
}

impl FromStr for MessageColumn {
    type Err = QueryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "source" => Self::Source,
            "destination" => Self::Destination,
            "snr" => Self::Snr,
            "rssi" => Self::Rssi,
            "portnum" => Self::Portnum,
            "message" => Self::Message,
            other => {
                return Err(QueryParseError::UnknownColumn {
                    table: "message",
                    column: other.to_string(),
                });
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeColumn {
    NodeId,
    NodeName,
    NodeShortName,
    Snr,
    LastHeard,
    Battery,
    Voltage,
}

impl FromStr for NodeColumn {
    type Err = QueryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "node_id" => Self::NodeId,
            "node_name" => Self::NodeName,
            "node_short_name" => Self::NodeShortName,
            "snr" => Self::Snr,
            "last_heard" => Self::LastHeard,
            "battery" => Self::Battery,
            "voltage" => Self::Voltage,
            other => {
                return Err(QueryParseError::UnknownColumn {
                    table: "node",
                    column: other.to_string(),
                });
            }
        })
    }
}

/// `column` or `column:asc` / `column:desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<C> {
    pub column: C,
    pub descending: bool,
}

impl<C: FromStr<Err = QueryParseError>> FromStr for SortSpec<C> {
    type Err = QueryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, order) = s.split_once(':').unwrap_or((s, "asc"));
        let descending = match order {
            "asc" => false,
            "desc" => true,
            other => return Err(QueryParseError::BadSortOrder(other.to_string())),
        };
        Ok(Self {
            column: column.trim().parse()?,
            descending,
        })
    }
}

/// Stable sort; absent values go last in either direction.
pub fn sort_messages(records: &mut [&MessageRecord], spec: SortSpec<MessageColumn>) {
    records.sort_by(|a, b| {
        let d = spec.descending;
        match spec.column {
            MessageColumn::Source => directed(a.source.cmp(&b.source), d),
            MessageColumn::Destination => directed(a.destination.cmp(&b.destination), d),
            MessageColumn::Portnum => directed(a.portnum.cmp(&b.portnum), d),
            MessageColumn::Message => directed(a.message.cmp(&b.message), d),
            MessageColumn::Snr => missing_last(a.snr, b.snr, d),
            MessageColumn::Rssi => missing_last(a.rssi, b.rssi, d),
        }
    });
}

/// Stable sort; absent values go last in either direction.
pub fn sort_nodes(nodes: &mut [&NodeRecord], spec: SortSpec<NodeColumn>) {
    nodes.sort_by(|a, b| {
        let d = spec.descending;
        match spec.column {
            NodeColumn::NodeId => directed(a.node_id.cmp(&b.node_id), d),
            NodeColumn::NodeName => missing_last(a.node_name.as_deref(), b.node_name.as_deref(), d),
            NodeColumn::NodeShortName => missing_last(
                a.node_short_name.as_deref(),
                b.node_short_name.as_deref(),
                d,
            ),
            NodeColumn::Snr => missing_last(a.snr, b.snr, d),
            NodeColumn::LastHeard => {
                missing_last(a.last_heard.as_deref(), b.last_heard.as_deref(), d)
            }
            NodeColumn::Battery => missing_last(a.battery_level, b.battery_level, d),
            NodeColumn::Voltage => missing_last(a.voltage, b.voltage, d),
        }
    });
}

fn directed(ord: Ordering, descending: bool) -> Ordering {
    if descending { ord.reverse() } else { ord }
}

fn missing_last<T: PartialOrd>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => directed(a.partial_cmp(&b).unwrap_or(Ordering::Equal), descending),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn msg(source: &str, snr: Option<f64>) -> MessageRecord {
        MessageRecord {
            source: source.into(),
            snr,
            ..MessageRecord::default()
        }
    }

    #[test]
    fn message_cells() {
        let row = MessageRow::from(&MessageRecord {
            snr: Some(6.0),
            rssi: None,
            ..MessageRecord::default()
        });
        assert_eq!(row.snr, "6dB");
        assert_eq!(row.rssi, "N/A");

        let row = MessageRow::from(&msg("!a", Some(-3.25)));
        assert_eq!(row.snr, "-3.25dB");
    }

    #[test]
    fn node_cells() {
        let row = NodeRow::from(&NodeRecord {
            node_id: "!n".into(),
            battery_level: Some(87),
            voltage: Some(4.1),
            ..NodeRecord::default()
        });
        assert_eq!(row.battery, "87%");
        assert_eq!(row.voltage, "4.1 V");
        assert_eq!(row.snr, "N/A");
        assert_eq!(row.node_name, "");
    }

    #[test]
    fn parses_sort_specs() {
        let s: SortSpec<MessageColumn> = "snr:desc".parse().unwrap();
        assert_eq!(s, SortSpec { column: MessageColumn::Snr, descending: true });

        let s: SortSpec<NodeColumn> = "last_heard".parse().unwrap();
        assert_eq!(s, SortSpec { column: NodeColumn::LastHeard, descending: false });

        assert!("snr:sideways".parse::<SortSpec<MessageColumn>>().is_err());
        assert!("battery".parse::<SortSpec<MessageColumn>>().is_err());
    }

    #[test]
    fn sort_spec_errors_are_typed() {
        let err = "snr:sideways".parse::<SortSpec<MessageColumn>>().unwrap_err();
        assert!(matches!(err, QueryParseError::BadSortOrder(ref o) if o == "sideways"));

        let err = "battery".parse::<SortSpec<MessageColumn>>().unwrap_err();
        assert!(matches!(
            err,
            QueryParseError::UnknownColumn { table: "message", ref column } if column == "battery"
        ));

        let err = "rssi:desc".parse::<SortSpec<NodeColumn>>().unwrap_err();
        assert!(matches!(err, QueryParseError::UnknownColumn { table: "node", .. }));
        assert_eq!(err.to_string(), r#"unknown node column "rssi""#);
    }

    #[test]
    fn absent_values_sort_last_both_ways() {
        let records = [msg("a", None), msg("b", Some(2.0)), msg("c", Some(-1.0)), msg("d", None)];

        let mut refs: Vec<&MessageRecord> = records.iter().collect();
        sort_messages(&mut refs, SortSpec { column: MessageColumn::Snr, descending: false });
        let order: Vec<&str> = refs.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a", "d"]);

        sort_messages(&mut refs, SortSpec { column: MessageColumn::Snr, descending: true });
        let order: Vec<&str> = refs.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn node_sort_by_battery_desc() {
        let nodes = [
            NodeRecord { node_id: "!low".into(), battery_level: Some(10), ..NodeRecord::default() },
            NodeRecord { node_id: "!none".into(), ..NodeRecord::default() },
            NodeRecord { node_id: "!high".into(), battery_level: Some(99), ..NodeRecord::default() },
        ];
        let mut refs: Vec<&NodeRecord> = nodes.iter().collect();
        sort_nodes(&mut refs, SortSpec { column: NodeColumn::Battery, descending: true });
        let order: Vec<&str> = refs.iter().map(|n| n.node_id.as_str()).collect();
        assert_eq!(order, vec!["!high", "!low", "!none"]);
    }
}
