//! Column layout shared by the flat and ranked tables.
use followgraph_common::{FieldSet, Followee, MetricField, UserField};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Username,
    Name,
    Attribute(UserField),
    /// One expanded `public_metrics` sub-field.
    Metric(MetricField),
    FollowedCount,
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Username => "username",
            Column::Name => "name",
            Column::Attribute(f) => f.as_str(),
            Column::Metric(m) => m.as_str(),
            Column::FollowedCount => "followed_count",
        }
    }

    /// The followee's value for this column, `None` when absent.
    ///
    /// `FollowedCount` is not a followee attribute and always yields `None` here.
    pub fn value(&self, f: &Followee) -> Option<String> {
        match self {
            Column::Username => Some(f.username.clone()),
            Column::Name => f.name.clone(),
            Column::Attribute(field) => attribute(f, *field),
            Column::Metric(m) => f.public_metrics.and_then(|pm| pm.get(*m)).map(|n| n.to_string()),
            Column::FollowedCount => None,
        }
    }
}

fn attribute(f: &Followee, field: UserField) -> Option<String> {
    match field {
        UserField::Id => f.id.map(|id| id.to_string()),
        UserField::CreatedAt => f.created_at.clone(),
        UserField::Description => f.description.clone(),
        UserField::Location => f.location.clone(),
        UserField::PinnedTweetId => f.pinned_tweet_id.clone(),
        UserField::ProfileImageUrl => f.profile_image_url.clone(),
        UserField::Protected => f.protected.map(|b| b.to_string()),
        UserField::PublicMetrics => f
            .public_metrics
            .as_ref()
            .and_then(|pm| serde_json::to_string(pm).ok()),
        UserField::Url => f.url.clone(),
        UserField::Verified => f.verified.map(|b| b.to_string()),
    }
}

/// Ordered followee columns: username, name, the requested attributes in request order,
/// then one column per metric that occurs in at least one followee.
///
/// The nested `public_metrics` column itself never appears; it is replaced by its
/// expansion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn for_followees<'a>(
        fields: &FieldSet,
        followees: impl IntoIterator<Item = &'a Followee>,
    ) -> Self {
        let mut columns = vec![Column::Username, Column::Name];
        columns.extend(
            fields
                .iter()
                .filter(|f| *f != UserField::PublicMetrics)
                .map(Column::Attribute),
        );

        if fields.contains(UserField::PublicMetrics) {
            let mut present = [false; MetricField::ALL.len()];
            for pm in followees.into_iter().filter_map(|f| f.public_metrics.as_ref()) {
                for (seen, m) in present.iter_mut().zip(MetricField::ALL) {
                    *seen |= pm.get(m).is_some();
                }
            }
            columns.extend(
                MetricField::ALL
                    .into_iter()
                    .zip(present)
                    .filter(|(_, seen)| *seen)
                    .map(|(m, _)| Column::Metric(m)),
            );
        }

        Self { columns }
    }

    /// Same columns with `followed_count` appended.
    pub fn ranked(&self) -> Self {
        let mut columns = self.columns.clone();
        if !columns.contains(&Column::FollowedCount) {
            columns.push(Column::FollowedCount);
        }
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(Column::header).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use followgraph_common::PublicMetrics;

    fn with_metrics(name: &str, pm: PublicMetrics) -> Followee {
        let mut f = Followee::new(name);
        f.public_metrics = Some(pm);
        f
    }

    #[test]
    fn metrics_expand_in_place_of_nested_column() {
        let fields: FieldSet = "public_metrics,description,verified".parse().unwrap();
        let rows = [with_metrics(
            "x",
            PublicMetrics {
                followers_count: Some(1),
                following_count: Some(2),
                tweet_count: Some(3),
                listed_count: Some(0),
                ..Default::default()
            },
        )];
        let schema = Schema::for_followees(&fields, &rows);
        assert_eq!(
            schema.headers(),
            vec![
                "username",
                "name",
                "description",
                "verified",
                "followers_count",
                "following_count",
                "tweet_count",
                "listed_count"
            ]
        );
    }

    #[test]
    fn metrics_absent_everywhere_produce_no_columns() {
        let fields: FieldSet = "public_metrics".parse().unwrap();
        let rows = [Followee::new("x")];
        assert_eq!(Schema::for_followees(&fields, &rows).headers(), vec!["username", "name"]);
    }

    #[test]
    fn values_render_missing_as_none() {
        let mut f = Followee::new("x");
        f.verified = Some(false);
        assert_eq!(Column::Name.value(&f), None);
        assert_eq!(Column::Attribute(UserField::Verified).value(&f).as_deref(), Some("false"));
        assert_eq!(Column::Metric(MetricField::TweetCount).value(&f), None);
    }

    #[test]
    fn ranked_appends_count_once() {
        let schema = Schema::for_followees(&FieldSet::default(), []).ranked().ranked();
        assert_eq!(schema.headers(), vec!["username", "name", "followed_count"]);
    }
}
