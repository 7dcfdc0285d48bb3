use async_trait::async_trait;
use followgraph_common::{FieldSet, ResolvedUser, UserId};
use followgraph_social::SocialError;
use followgraph_social::twitter::types::User;
use followgraph_social::twitter::{
    FetchLimits, FollowGraphSource, FollowingPage, PageRequest, fetch_followees,
    fetch_followees_by_usernames, resolve_user_ids,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory provider: `known` maps lowercase usernames to ids, `follows` maps ids to
/// followee usernames served `page` at a time.
#[derive(Default)]
struct FakeGraph {
    known: HashMap<String, u64>,
    follows: HashMap<u64, Vec<String>>,
    lookup_calls: Mutex<Vec<usize>>,
    page_calls: Mutex<Vec<(u64, u32, Option<String>)>>,
}

impl FakeGraph {
    fn with_users(names: &[&str]) -> Self {
        let known = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.to_lowercase(), i as u64 + 1))
            .collect();
        Self {
            known,
            ..Default::default()
        }
    }

    fn following(mut self, id: u64, names: &[&str]) -> Self {
        self.follows
            .insert(id, names.iter().map(|s| s.to_string()).collect());
        self
    }
}

#[async_trait]
impl FollowGraphSource for FakeGraph {
    async fn lookup_users(&self, usernames: &[String]) -> Result<Vec<ResolvedUser>, SocialError> {
        self.lookup_calls.lock().unwrap().push(usernames.len());
        Ok(usernames
            .iter()
            .filter_map(|u| {
                self.known.get(&u.to_lowercase()).map(|id| ResolvedUser {
                    username: u.to_lowercase(),
                    id: UserId(*id),
                })
            })
            .collect())
    }

    async fn following_page(
        &self,
        id: UserId,
        request: PageRequest<'_>,
    ) -> Result<FollowingPage, SocialError> {
        self.page_calls.lock().unwrap().push((
            id.0,
            request.max_results,
            request.pagination_token.map(str::to_string),
        ));
        let all = self.follows.get(&id.0).cloned().unwrap_or_default();
        let start: usize = request
            .pagination_token
            .map(|t| t.parse().unwrap())
            .unwrap_or(0);
        let end = (start + request.max_results as usize).min(all.len());
        let users = all[start..end]
            .iter()
            .map(|name| User {
                id: "1000".into(),
                username: name.clone(),
                name: Some(name.to_uppercase()),
                verified: Some(false),
                ..Default::default()
            })
            .collect();
        let next_token = (end < all.len()).then(|| end.to_string());
        Ok(FollowingPage { users, next_token })
    }
}

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("user{i}")).collect()
}

#[tokio::test]
async fn resolver_issues_one_lookup_per_batch() {
    for (n, expected_calls) in [(0usize, 0usize), (1, 1), (100, 1), (101, 2), (250, 3)] {
        let seeds = names(n);
        let refs: Vec<&str> = seeds.iter().map(String::as_str).collect();
        let fake = FakeGraph::with_users(&refs);
        let ids = resolve_user_ids(&fake, &seeds, 100).await.unwrap();

        let calls = fake.lookup_calls.lock().unwrap().clone();
        assert_eq!(calls.len(), expected_calls, "n={n}");
        assert!(calls.iter().all(|c| *c <= 100));
        assert_eq!(ids.len(), n);
    }
}

#[tokio::test]
async fn batch_boundaries_do_not_change_the_result() {
    let seeds = names(37);
    let refs: Vec<&str> = seeds.iter().map(String::as_str).collect();
    let fake = FakeGraph::with_users(&refs[..30]);

    let small = resolve_user_ids(&fake, &seeds, 7).await.unwrap();
    let large = resolve_user_ids(&fake, &seeds, 100).await.unwrap();
    assert_eq!(small, large);
    assert_eq!(small.len(), 30);
    assert!(small.keys().all(|k| seeds.contains(k)));
}

#[tokio::test]
async fn fetcher_follows_cursor_until_exhausted() {
    let fake = FakeGraph::with_users(&["seed"]).following(1, &["a", "b", "c", "d", "e"]);
    let fields: FieldSet = "verified".parse().unwrap();

    let got = fetch_followees(&fake, UserId(1), &fields, 2).await.unwrap();
    let usernames: Vec<_> = got.iter().map(|f| f.username.as_str()).collect();
    assert_eq!(usernames, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(got[0].name.as_deref(), Some("A"));
    assert_eq!(got[0].verified, Some(false));

    let calls = fake.page_calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            (1, 2, None),
            (1, 2, Some("2".to_string())),
            (1, 2, Some("4".to_string())),
        ]
    );
}

#[tokio::test]
async fn unrequested_attributes_are_dropped() {
    let fake = FakeGraph::with_users(&["seed"]).following(1, &["a"]);
    let got = fetch_followees(&fake, UserId(1), &FieldSet::default(), 1000)
        .await
        .unwrap();
    assert_eq!(got[0].verified, None);
    assert_eq!(got[0].name.as_deref(), Some("A"));
}

#[tokio::test]
async fn unknown_seeds_are_omitted_not_fatal() {
    let fake = FakeGraph::with_users(&["alice", "bob"])
        .following(1, &["x", "y"])
        .following(2, &["x"]);
    let seeds = vec!["alice".to_string(), "bob".into(), "nobody".into()];

    let (raw, report) =
        fetch_followees_by_usernames(&fake, &seeds, &FieldSet::default(), FetchLimits::default())
            .await
            .unwrap();

    assert_eq!(raw.len(), 2);
    assert_eq!(raw["alice"].len(), 2);
    assert_eq!(raw["bob"].len(), 1);
    assert_eq!(report.unresolved, vec!["nobody".to_string()]);
}

#[tokio::test]
async fn seed_without_followees_maps_to_empty_list() {
    let fake = FakeGraph::with_users(&["loner"]);
    let seeds = vec!["loner".to_string()];
    let (raw, report) =
        fetch_followees_by_usernames(&fake, &seeds, &FieldSet::default(), FetchLimits::default())
            .await
            .unwrap();
    assert!(report.is_complete());
    assert!(raw["loner"].is_empty());
}
