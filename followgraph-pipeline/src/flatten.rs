use followgraph_common::{FieldSet, Followee, RawResult};

use crate::schema::Schema;

/// One (seed, followee) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow {
    pub seed_username: String,
    pub followee: Followee,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlatTable {
    pub schema: Schema,
    pub rows: Vec<FlatRow>,
}

/// Turn the nested seed to followees mapping into one row per pair.
///
/// Seeds with no followees contribute no rows. Rows are ordered by seed username; within
/// a seed the provider's order is kept.
pub fn flatten(raw: RawResult, fields: &FieldSet) -> FlatTable {
    let schema = Schema::for_followees(fields, raw.values().flatten());
    let mut rows: Vec<FlatRow> = raw
        .into_iter()
        .flat_map(|(seed, followees)| {
            followees.into_iter().map(move |followee| FlatRow {
                seed_username: seed.clone(),
                followee,
            })
        })
        .collect();
    rows.sort_by(|a, b| a.seed_username.cmp(&b.seed_username));

    tracing::debug!(rows = rows.len(), columns = schema.columns().len(), "flatten.done");
    FlatTable { schema, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use followgraph_common::PublicMetrics;

    #[test]
    fn one_row_per_pair_and_empty_seeds_vanish() {
        let raw = RawResult::from([
            ("bob".to_string(), vec![Followee::new("x")]),
            ("alice".to_string(), vec![Followee::new("x"), Followee::new("y")]),
            ("carol".to_string(), vec![]),
        ]);
        let table = flatten(raw, &FieldSet::default());

        let pairs: Vec<_> = table
            .rows
            .iter()
            .map(|r| (r.seed_username.as_str(), r.followee.username.as_str()))
            .collect();
        assert_eq!(pairs, vec![("alice", "x"), ("alice", "y"), ("bob", "x")]);
    }

    #[test]
    fn metrics_columns_follow_the_data() {
        let mut f = Followee::new("x");
        f.public_metrics = Some(PublicMetrics {
            like_count: Some(4),
            ..Default::default()
        });
        let raw = RawResult::from([("alice".to_string(), vec![f])]);
        let table = flatten(raw, &"public_metrics".parse().unwrap());
        assert_eq!(table.schema.headers(), vec!["username", "name", "like_count"]);
    }

    #[test]
    fn empty_input_gives_empty_table() {
        let table = flatten(RawResult::new(), &FieldSet::default());
        assert!(table.rows.is_empty());
    }
}
