use meshdash::query::{FilterToken, Mode, Operator, PropertyKey, Query};
use meshdash::record::MessageRecord;
use proptest::prelude::*;

const NODE_IDS: &[&str] = &["A", "B", "C", "AB", "!a1", "^all", ""];
const PORTNUMS: &[&str] = &[
    "ADMIN_APP",
    "ROUTING_APP",
    "TEXT_MESSAGE_APP",
    "TELEMETRY_APP",
    "NODEINFO_APP",
];

pub fn arb_record() -> impl Strategy<Value = MessageRecord> {
    (
        prop::sample::select(NODE_IDS),
        prop::sample::select(NODE_IDS),
        prop::sample::select(PORTNUMS),
        prop::option::of(-20.0f64..20.0),
        prop::option::of(-130i64..0),
    )
        .prop_map(|(source, destination, portnum, snr, rssi)| MessageRecord {
            source: source.to_string(),
            destination: destination.to_string(),
            message: format!("{source} to {destination}"),
            snr,
            rssi,
            portnum: portnum.to_string(),
        })
}

pub fn arb_snapshot() -> impl Strategy<Value = Vec<MessageRecord>> {
    prop::collection::vec(arb_record(), 0..24)
}

pub fn arb_property() -> impl Strategy<Value = PropertyKey> {
    prop::sample::select(PropertyKey::ALL.to_vec())
}

pub fn arb_operator() -> impl Strategy<Value = Operator> {
    prop::sample::select(vec![
        Operator::Equals,
        Operator::NotEquals,
        Operator::Contains,
        Operator::NotContains,
    ])
}

pub fn arb_value() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(NODE_IDS).prop_map(str::to_string),
        prop::sample::select(PORTNUMS).prop_map(str::to_string),
        Just("APP".to_string()),
        Just("TEXT".to_string()),
    ]
}

pub fn arb_token() -> impl Strategy<Value = FilterToken> {
    (arb_property(), arb_operator(), arb_value())
        .prop_map(|(property, operator, value)| FilterToken::new(property, operator, value))
}

/// A token the engine must ignore: property or operator undefined.
pub fn arb_inert_token() -> impl Strategy<Value = FilterToken> {
    (
        prop::option::of(arb_property()),
        prop::option::of(arb_operator()),
        arb_value(),
    )
        .prop_filter("must be ill-formed", |(p, o, _)| p.is_none() || o.is_none())
        .prop_map(|(property, operator, value)| FilterToken {
            property,
            operator,
            value,
        })
}

pub fn arb_mode() -> impl Strategy<Value = Mode> {
    prop_oneof![Just(Mode::And), Just(Mode::Or)]
}

pub fn arb_query() -> impl Strategy<Value = Query> {
    (
        arb_mode(),
        prop::collection::vec(prop_oneof![4 => arb_token(), 1 => arb_inert_token()], 0..5),
    )
        .prop_map(|(mode, tokens)| Query::new(mode, tokens))
}
