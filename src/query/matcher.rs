use crate::query::token::{FilterToken, Operator, PropertyKey};
use crate::record::MessageRecord;

/// Evaluate one token against one record.
///
/// Comparison is plain string comparison: `contains` is a case-sensitive
/// literal substring test. Fails closed: a token without a known property or
/// operator matches nothing.
pub fn matches(token: &FilterToken, record: &MessageRecord) -> bool {
    let (Some(property), Some(operator)) = (token.property, token.operator) else {
        return false;
    };

    let field = field(record, property);
    let value = token.value.as_str();

    match operator {
        Operator::Equals => field == value,
        Operator::NotEquals => field != value,
        Operator::Contains => field.contains(value),
        Operator::NotContains => !field.contains(value),
    }
}

fn field(record: &MessageRecord, property: PropertyKey) -> &str {
    match property {
        PropertyKey::Source => &record.source,
        PropertyKey::Destination => &record.destination,
        PropertyKey::Portnum => &record.portnum,
    }
}
