//! Query evaluation over a whole snapshot.
//!
//! The two modes accumulate differently:
//! - AND starts from the full snapshot and narrows the working set token by
//!   token.
//! - OR starts empty and, for every token, rescans the full snapshot and
//!   merges the hits into a positional set union, so a record matched by
//!   several tokens still appears once.
//!
//! Tokens that are not well formed are skipped in both modes.

use crate::query::matcher::matches;
use crate::query::token::{FilterToken, Mode, Query};
use crate::record::MessageRecord;

use std::collections::BTreeSet;

/// Records of one snapshot that passed a query, in snapshot order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    snapshot: &'a [MessageRecord],
    positions: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Snapshot positions of the matching records, ascending.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a MessageRecord> + '_ {
        let snapshot = self.snapshot;
        self.positions.iter().map(move |&i| &snapshot[i])
    }

    pub fn to_records(&self) -> Vec<MessageRecord> {
        self.iter().cloned().collect()
    }

    /// Human readable match count, e.g. `"3 matches"`.
    pub fn count_text(&self) -> String {
        format!("{} matches", self.len())
    }
}

/// Derive the filtered view of `snapshot` under `query`. Never fails.
pub fn evaluate<'a>(snapshot: &'a [MessageRecord], query: &Query) -> FilteredView<'a> {
    let tokens = query.tokens.iter().filter(|t| t.is_well_formed());

    let positions = match query.mode {
        Mode::And => narrow(snapshot, tokens),
        Mode::Or => union(snapshot, tokens),
    };

    FilteredView {
        snapshot,
        positions,
    }
}

fn narrow<'t>(
    snapshot: &[MessageRecord],
    tokens: impl Iterator<Item = &'t FilterToken>,
) -> Vec<usize> {
    let mut working: Vec<usize> = (0..snapshot.len()).collect();
    for token in tokens {
        working.retain(|&i| matches(token, &snapshot[i]));
    }
    working
}

fn union<'t>(
    snapshot: &[MessageRecord],
    tokens: impl Iterator<Item = &'t FilterToken>,
) -> Vec<usize> {
    let mut merged: BTreeSet<usize> = BTreeSet::new();
    for token in tokens {
        let hits = snapshot
            .iter()
            .enumerate()
            .filter(|(_, record)| matches(token, record))
            .map(|(i, _)| i);
        merged.extend(hits);
    }
    merged.into_iter().collect()
}
