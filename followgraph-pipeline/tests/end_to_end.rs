use async_trait::async_trait;
use followgraph_common::{
    FieldSet, PublicMetrics, RawResult, ResolvedUser, SnapshotPolicy, UserId,
};
use followgraph_pipeline::report::BOM;
use followgraph_pipeline::{
    CollectOptions, SnapshotOutcome, SnapshotTarget, build_report, collect_followees,
    read_snapshot, write_report,
};
use followgraph_social::SocialError;
use followgraph_social::twitter::types::User;
use followgraph_social::twitter::{FetchLimits, FollowGraphSource, FollowingPage, PageRequest};
use std::collections::HashMap;

/// alice follows x and y, bob follows x; everything fits in one page.
struct TwoSeeds {
    graph: HashMap<u64, Vec<User>>,
}

fn user(id: &str, username: &str, followers: u64) -> User {
    User {
        id: id.into(),
        username: username.into(),
        name: Some(username.to_uppercase()),
        description: Some(format!("about {username}")),
        verified: Some(false),
        public_metrics: Some(PublicMetrics {
            followers_count: Some(followers),
            following_count: Some(1),
            tweet_count: Some(2),
            listed_count: Some(0),
            ..Default::default()
        }),
        ..Default::default()
    }
}

impl TwoSeeds {
    fn new() -> Self {
        Self {
            graph: HashMap::from([
                (1, vec![user("10", "x", 100), user("20", "y", 5)]),
                (2, vec![user("10", "x", 100)]),
            ]),
        }
    }
}

#[async_trait]
impl FollowGraphSource for TwoSeeds {
    async fn lookup_users(&self, usernames: &[String]) -> Result<Vec<ResolvedUser>, SocialError> {
        Ok(usernames
            .iter()
            .filter_map(|u| match u.as_str() {
                "alice" => Some(ResolvedUser {
                    username: "alice".into(),
                    id: UserId(1),
                }),
                "bob" => Some(ResolvedUser {
                    username: "bob".into(),
                    id: UserId(2),
                }),
                _ => None,
            })
            .collect())
    }

    async fn following_page(
        &self,
        id: UserId,
        request: PageRequest<'_>,
    ) -> Result<FollowingPage, SocialError> {
        let users = self
            .graph
            .get(&id.0)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|u| {
                // The provider only returns what was asked for.
                if request.fields.query_value().is_none() {
                    User {
                        id: u.id,
                        username: u.username,
                        name: u.name,
                        ..Default::default()
                    }
                } else {
                    u
                }
            })
            .collect();
        Ok(FollowingPage {
            users,
            next_token: None,
        })
    }
}

fn seeds() -> Vec<String> {
    vec!["alice".into(), "bob".into(), "ghost".into()]
}

fn fields() -> FieldSet {
    "description,public_metrics,verified".parse().unwrap()
}

#[tokio::test]
async fn collect_rank_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let raw_path = dir.path().join("data/raw.json");
    let options = CollectOptions {
        fields: fields(),
        limits: FetchLimits::default(),
        snapshot: Some(SnapshotTarget {
            path: raw_path.clone(),
            policy: SnapshotPolicy::Skip,
        }),
    };

    let collected = collect_followees(&TwoSeeds::new(), &seeds(), &options)
        .await
        .unwrap();
    assert_eq!(collected.snapshot, Some(SnapshotOutcome::Written));
    assert_eq!(collected.resolution.unresolved, vec!["ghost".to_string()]);
    assert_eq!(read_snapshot(&raw_path).unwrap(), collected.raw);

    let table = build_report(collected.raw, &options.fields);
    let counts: Vec<_> = table
        .rows
        .iter()
        .map(|r| (r.followee.username.as_str(), r.followed_count))
        .collect();
    assert_eq!(counts, vec![("x", 2), ("y", 1)]);

    let report_path = dir.path().join("data/results.csv");
    write_report(&table, &report_path).unwrap();
    let bytes = std::fs::read(&report_path).unwrap();
    assert!(bytes.starts_with(BOM));
    let text = String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "username;name;description;verified;followers_count;following_count;tweet_count;listed_count;followed_count",
            "x;X;about x;false;100;1;2;0;2",
            "y;Y;about y;false;5;1;2;0;1",
        ]
    );
}

#[tokio::test]
async fn second_run_keeps_first_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let raw_path = dir.path().join("raw.json");
    let stale = RawResult::from([("someone".to_string(), vec![])]);
    followgraph_pipeline::write_snapshot(&stale, &raw_path, SnapshotPolicy::Skip).unwrap();

    let options = CollectOptions {
        fields: fields(),
        limits: FetchLimits::default(),
        snapshot: Some(SnapshotTarget {
            path: raw_path.clone(),
            policy: SnapshotPolicy::Skip,
        }),
    };
    let collected = collect_followees(&TwoSeeds::new(), &seeds(), &options)
        .await
        .unwrap();

    assert_eq!(collected.snapshot, Some(SnapshotOutcome::Skipped));
    assert_eq!(collected.raw.len(), 2);
    assert_eq!(read_snapshot(&raw_path).unwrap(), stale);
}

#[tokio::test]
async fn report_is_deterministic_and_survives_snapshot_reload() {
    let dir = tempfile::tempdir().unwrap();
    let raw_path = dir.path().join("raw.json");
    let options = CollectOptions {
        fields: fields(),
        snapshot: Some(SnapshotTarget {
            path: raw_path.clone(),
            policy: SnapshotPolicy::Overwrite,
        }),
        ..Default::default()
    };
    let collected = collect_followees(&TwoSeeds::new(), &seeds(), &options)
        .await
        .unwrap();

    let first = build_report(collected.raw.clone(), &options.fields);
    let second = build_report(collected.raw, &options.fields);
    let reloaded = build_report(read_snapshot(&raw_path).unwrap(), &options.fields);
    assert_eq!(first, second);
    assert_eq!(first, reloaded);
}

#[tokio::test]
async fn no_snapshot_without_target() {
    let options = CollectOptions::default();
    let collected = collect_followees(&TwoSeeds::new(), &seeds(), &options)
        .await
        .unwrap();
    assert_eq!(collected.snapshot, None);

    let table = build_report(collected.raw, &options.fields);
    assert_eq!(table.schema.headers(), vec!["username", "name", "followed_count"]);
    assert_eq!(table.rows[0].followee.description, None);
}

#[test]
fn options_follow_run_config() {
    let cfg = followgraph_config::RunConfig {
        save_raw: false,
        ..Default::default()
    };
    let options = CollectOptions::from_config(&cfg);
    assert!(options.snapshot.is_none());
    assert_eq!(options.fields, cfg.user_fields);

    let options = CollectOptions::from_config(&followgraph_config::RunConfig::default());
    let target = options.snapshot.unwrap();
    assert_eq!(target.path, std::path::Path::new("data").join("raw.json"));
    assert_eq!(target.policy, SnapshotPolicy::Skip);
}
