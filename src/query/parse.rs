//! Command-line token syntax and query files.
//!
//! A token is written `<property><operator><value>`, for example
//! `portnum=TEXT_MESSAGE_APP`, `source:!a1` or `destination!=^all`.
//! Operators: `=` equals, `!=` does not equal, `:` contains,
//! `!:` does not contain. The value is taken verbatim (it may be empty).

use crate::Result;
use crate::query::token::{FilterToken, Mode, Query};

use anyhow::Context;
use regex::Regex;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryParseError {
    #[error("filter token {0:?} has no operator (expected one of =, !=, :, !:)")]
    MissingOperator(String),

    #[error("unknown property {0:?} (expected source, destination or portnum)")]
    UnknownProperty(String),

    #[error("unknown operator {0:?}")]
    UnknownOperator(String),

    #[error("unknown {table} column {column:?}")]
    UnknownColumn { table: &'static str, column: String },

    #[error("sort order must be asc or desc, got {0:?}")]
    BadSortOrder(String),

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

// Two-character operators first so `!=` is not read as `!` + `=`.
const TOKEN_RE: &str = r"^\s*([^=!:]*?)\s*(!=|!:|=|:)(.*)$";

/// Parse one command-line filter token.
///
/// An unknown or empty property is not an error: the token is returned with
/// `property: None` and is ignored during evaluation.
pub fn parse_token(text: &str) -> std::result::Result<FilterToken, QueryParseError> {
    let re = Regex::new(TOKEN_RE)?;
    let caps = re
        .captures(text)
        .ok_or_else(|| QueryParseError::MissingOperator(text.to_string()))?;

    let property_str = caps.get(1).map_or("", |m| m.as_str());
    let operator_str = caps.get(2).map_or("", |m| m.as_str());
    let value = caps.get(3).map_or("", |m| m.as_str()).to_string();

    let property = match property_str.parse() {
        Ok(p) => Some(p),
        Err(err) => {
            tracing::warn!(token = text, %err, "filter token will be ignored");
            None
        }
    };

    Ok(FilterToken {
        property,
        operator: Some(operator_str.parse()?),
        value,
    })
}

/// Build a query from command-line pieces.
///
/// Precedence: explicit tokens, then `clear` (no tokens), then the default
/// startup query.
pub fn query_from_args(mode: Mode, filters: &[String], clear: bool) -> Result<Query> {
    if !filters.is_empty() {
        let tokens = filters
            .iter()
            .map(|f| parse_token(f))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        return Ok(Query::new(mode, tokens));
    }
    if clear {
        return Ok(Query::new(mode, Vec::new()));
    }
    Ok(Query::default())
}

/// Load a query saved in the property filter JSON shape.
pub fn load_query_file(path: &Path) -> Result<Query> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read query file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse query file {}", path.display()))
}
