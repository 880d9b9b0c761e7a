//! # Models
//!
//! Rows owned by the data access layer and the response envelopes they are
//! wrapped in.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// Lowest vote tally an article may hold (the range of a SQL `INT`)
pub const MIN_VOTES: i64 = -2_147_483_648;

/// Highest vote tally an article may hold
pub const MAX_VOTES: i64 = 2_147_483_647;

/// A topic articles are filed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Topic {
    /// Unique identifier
    pub slug: String,
    /// Human readable description
    pub description: String,
}

/// A published article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Article {
    /// Username of the author
    pub author: String,
    /// Headline
    pub title: String,
    /// Unique, positive identifier
    pub article_id: i64,
    /// Full text
    pub body: String,
    /// Slug of the topic the article belongs to
    pub topic: String,
    /// Creation time, serialized as `2020-07-09T20:11:00.000Z`
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    /// Current vote tally, within `MIN_VOTES..=MAX_VOTES`; changes only by
    /// increments
    pub votes: i64,
}

/// A user who can author articles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique login name
    pub username: String,
    /// Display name
    pub name: String,
    /// Avatar image location
    pub avatar_url: String,
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// `GET /api/topics` body
#[derive(Debug, Serialize)]
pub struct TopicList<'a> {
    /// All topics
    pub results: &'a [Topic],
}

/// Single-article body shared by `GET` and `PATCH /api/articles/{id}`
#[derive(Debug, Serialize)]
pub struct ArticleEnvelope<'a> {
    /// The article
    #[serde(rename = "articleObj")]
    pub article: &'a Article,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn article() -> Article {
        Article {
            author: "butter_bridge".into(),
            title: "Living in the shadow of a great man".into(),
            article_id: 1,
            body: "I find this existence challenging".into(),
            topic: "mitch".into(),
            created_at: Utc.with_ymd_and_hms(2020, 7, 9, 20, 11, 0).unwrap(),
            votes: 100,
        }
    }

    #[test]
    fn test_article_envelope_shape() {
        let article = article();
        let value: Value = serde_json::to_value(ArticleEnvelope { article: &article }).unwrap();
        assert_eq!(
            value,
            json!({
                "articleObj": {
                    "author": "butter_bridge",
                    "title": "Living in the shadow of a great man",
                    "article_id": 1,
                    "body": "I find this existence challenging",
                    "topic": "mitch",
                    "created_at": "2020-07-09T20:11:00.000Z",
                    "votes": 100
                }
            })
        );
    }

    #[test]
    fn test_topic_list_shape() {
        let topics = vec![Topic {
            slug: "cats".into(),
            description: "Not dogs".into(),
        }];
        let value = serde_json::to_value(TopicList { results: &topics }).unwrap();
        assert_eq!(value, json!({"results": [{"slug": "cats", "description": "Not dogs"}]}));

        let empty = serde_json::to_value(TopicList { results: &[] }).unwrap();
        assert_eq!(empty, json!({"results": []}));
    }
}
