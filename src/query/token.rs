//! Query value types.
//!
//! JSON shape (same as the dashboard's property filter state):
//! {
//!   "operation": "and",
//!   "tokens": [
//!     { "propertyKey": "portnum", "operator": "=", "value": "TEXT_MESSAGE_APP" }
//!   ]
//! }
//!
//! Unknown property keys and operators are kept as `None` instead of failing
//! the whole document, so a half-edited filter still loads.

use crate::query::parse::QueryParseError;

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Message field a token can filter on. Only string fields are filterable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKey {
    Source,
    Destination,
    Portnum,
}

impl PropertyKey {
    pub const ALL: [PropertyKey; 3] = [Self::Source, Self::Destination, Self::Portnum];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Destination => "destination",
            Self::Portnum => "portnum",
        }
    }
}

impl FromStr for PropertyKey {
    type Err = QueryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" => Ok(Self::Source),
            "destination" => Ok(Self::Destination),
            "portnum" => Ok(Self::Portnum),
            other => Err(QueryParseError::UnknownProperty(other.to_string())),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String comparison applied between a field and the token value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Equals,
    #[serde(rename = "!=")]
    NotEquals,
    #[serde(rename = ":")]
    Contains,
    #[serde(rename = "!:")]
    NotContains,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::Contains => ":",
            Self::NotContains => "!:",
        }
    }
}

impl FromStr for Operator {
    type Err = QueryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "equals" => Ok(Self::Equals),
            "!=" | "not_equals" => Ok(Self::NotEquals),
            ":" | "contains" => Ok(Self::Contains),
            "!:" | "not_contains" => Ok(Self::NotContains),
            other => Err(QueryParseError::UnknownOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Boolean combinator applied across all tokens of a query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    #[serde(alias = "AND")]
    And,
    #[serde(alias = "OR")]
    Or,
}

/// One `(property, operator, value)` clause.
///
/// `property` / `operator` are `None` when the source left them unset or used
/// a name this engine does not know. Such a token is inert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterToken {
    #[serde(
        rename = "propertyKey",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub property: Option<PropertyKey>,

    #[serde(default, deserialize_with = "lenient")]
    pub operator: Option<Operator>,

    #[serde(default, deserialize_with = "lenient_value")]
    pub value: String,
}

impl FilterToken {
    pub fn new(property: PropertyKey, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            property: Some(property),
            operator: Some(operator),
            value: value.into(),
        }
    }

    /// True when both property and operator are known.
    pub fn is_well_formed(&self) -> bool {
        self.property.is_some() && self.operator.is_some()
    }
}

impl fmt::Display for FilterToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let property = self.property.map_or("?", PropertyKey::as_str);
        let operator = self.operator.map_or("?", Operator::symbol);
        write!(f, "{property} {operator} {}", self.value)
    }
}

/// Mode plus ordered tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    #[serde(rename = "operation", default)]
    pub mode: Mode,

    #[serde(default)]
    pub tokens: Vec<FilterToken>,
}

impl Query {
    pub fn new(mode: Mode, tokens: Vec<FilterToken>) -> Self {
        Self { mode, tokens }
    }

    pub fn and(tokens: Vec<FilterToken>) -> Self {
        Self::new(Mode::And, tokens)
    }

    pub fn or(tokens: Vec<FilterToken>) -> Self {
        Self::new(Mode::Or, tokens)
    }
}

/// Startup query: text messages only.
impl Default for Query {
    fn default() -> Self {
        Self::and(vec![FilterToken::new(
            PropertyKey::Portnum,
            Operator::Equals,
            "TEXT_MESSAGE_APP",
        )])
    }
}

// Accepts any JSON here; only a known name in a string yields `Some`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(raw.as_str().and_then(|s| s.trim().parse().ok()))
}

fn lenient_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}
