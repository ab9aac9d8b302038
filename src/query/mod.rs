//! Filter query engine.
//!
//! A query is one boolean mode plus an ordered list of tokens. Evaluation is
//! a pure function of (snapshot, query): the same inputs always give the same
//! filtered view, and nothing is carried over between evaluations.
//!
//! - `token`: query value types and their JSON shape
//! - `matcher`: one token against one record
//! - `eval`: the AND / OR fold over a whole snapshot
//! - `parse`: command-line token and sort syntax

pub mod eval;
pub mod matcher;
pub mod parse;
pub mod token;

pub use eval::{FilteredView, evaluate};
pub use matcher::matches;
pub use parse::{QueryParseError, load_query_file, parse_token, query_from_args};
pub use token::{FilterToken, Mode, Operator, PropertyKey, Query};
