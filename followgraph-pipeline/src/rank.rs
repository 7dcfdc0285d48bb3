use followgraph_common::Followee;
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::flatten::FlatTable;
use crate::schema::{Column, Schema};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedRow {
    pub followee: Followee,
    pub followed_count: usize,
}

impl RankedRow {
    /// Cell text for every column of `schema`; absent values are empty strings.
    pub fn cells(&self, schema: &Schema) -> Vec<String> {
        schema
            .columns()
            .iter()
            .map(|c| match c {
                Column::FollowedCount => self.followed_count.to_string(),
                other => other.value(&self.followee).unwrap_or_default(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RankedTable {
    pub schema: Schema,
    pub rows: Vec<RankedRow>,
}

/// Count how many distinct seeds follow each username, order by that count descending
/// then username ascending, and keep one row per username.
///
/// When a username occurs several times the first occurrence in the flat table's order
/// supplies the attribute values.
pub fn rank(table: FlatTable) -> RankedTable {
    let mut followers: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for row in &table.rows {
        followers
            .entry(row.followee.username.as_str())
            .or_default()
            .insert(row.seed_username.as_str());
    }
    let counts: HashMap<String, usize> = followers
        .into_iter()
        .map(|(username, seeds)| (username.to_string(), seeds.len()))
        .collect();

    let mut rows: Vec<RankedRow> = table
        .rows
        .into_iter()
        .map(|row| RankedRow {
            followed_count: counts
                .get(&row.followee.username)
                .copied()
                .unwrap_or_default(),
            followee: row.followee,
        })
        .collect();
    rows.sort_by(|a, b| {
        (Reverse(a.followed_count), &a.followee.username)
            .cmp(&(Reverse(b.followed_count), &b.followee.username))
    });

    let mut seen = HashSet::new();
    rows.retain(|r| seen.insert(r.followee.username.clone()));

    tracing::debug!(rows = rows.len(), "rank.done");
    RankedTable {
        schema: table.schema.ranked(),
        rows,
    }
}
