//! # Seeding
//!
//! Schema creation and fixture loading. Seeding drops and recreates every
//! table, so article ids restart at 1 in fixture order.

use crate::database::{with_pool, DatabasePool};
use crate::error::Result;
use crate::models::{Article, Topic, User};
use chrono::{DateTime, TimeZone, Utc};
use tracing::info;

const DROP_TABLES: [&str; 3] = [
    "DROP TABLE IF EXISTS articles",
    "DROP TABLE IF EXISTS users",
    "DROP TABLE IF EXISTS topics",
];

const SQLITE_SCHEMA: [&str; 3] = [
    "CREATE TABLE topics (
        slug TEXT PRIMARY KEY,
        description TEXT NOT NULL
    )",
    "CREATE TABLE users (
        username TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        avatar_url TEXT NOT NULL
    )",
    "CREATE TABLE articles (
        article_id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        votes INTEGER NOT NULL DEFAULT 0,
        topic TEXT NOT NULL REFERENCES topics(slug),
        author TEXT NOT NULL REFERENCES users(username),
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )",
];

const POSTGRES_SCHEMA: [&str; 3] = [
    "CREATE TABLE topics (
        slug VARCHAR PRIMARY KEY,
        description VARCHAR NOT NULL
    )",
    "CREATE TABLE users (
        username VARCHAR PRIMARY KEY,
        name VARCHAR NOT NULL,
        avatar_url VARCHAR NOT NULL
    )",
    "CREATE TABLE articles (
        article_id BIGSERIAL PRIMARY KEY,
        title VARCHAR NOT NULL,
        body VARCHAR NOT NULL,
        votes BIGINT NOT NULL DEFAULT 0,
        topic VARCHAR NOT NULL REFERENCES topics(slug),
        author VARCHAR NOT NULL REFERENCES users(username),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
];

const INSERT_TOPIC: &str = "INSERT INTO topics (slug, description) VALUES ($1, $2)";
const INSERT_USER: &str = "INSERT INTO users (username, name, avatar_url) VALUES ($1, $2, $3)";
const INSERT_ARTICLE: &str = "INSERT INTO articles (title, topic, author, body, created_at, votes) \
     VALUES ($1, $2, $3, $4, $5, $6)";

/// An article before the database has assigned its id
#[derive(Debug, Clone)]
pub struct NewArticle {
    /// Headline
    pub title: String,
    /// Topic slug
    pub topic: String,
    /// Author username
    pub author: String,
    /// Full text
    pub body: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Initial vote tally
    pub votes: i64,
}

impl NewArticle {
    /// The row this becomes once assigned `article_id`
    #[must_use]
    pub fn with_id(&self, article_id: i64) -> Article {
        Article {
            author: self.author.clone(),
            title: self.title.clone(),
            article_id,
            body: self.body.clone(),
            topic: self.topic.clone(),
            created_at: self.created_at,
            votes: self.votes,
        }
    }
}

/// A complete data set to load
#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    /// Topics, inserted first
    pub topics: Vec<Topic>,
    /// Users, inserted second
    pub users: Vec<User>,
    /// Articles, inserted last in id order
    pub articles: Vec<NewArticle>,
}

fn topic(slug: &str, description: &str) -> Topic {
    Topic {
        slug: slug.into(),
        description: description.into(),
    }
}

fn user(username: &str, name: &str, avatar_url: &str) -> User {
    User {
        username: username.into(),
        name: name.into(),
        avatar_url: avatar_url.into(),
    }
}

fn article(
    title: &str,
    topic: &str,
    author: &str,
    body: &str,
    created_at: (i32, u32, u32, u32, u32),
    votes: i64,
) -> NewArticle {
    let (y, mo, d, h, mi) = created_at;
    NewArticle {
        title: title.into(),
        topic: topic.into(),
        author: author.into(),
        body: body.into(),
        created_at: Utc
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .single()
            .unwrap_or_default(),
        votes,
    }
}

impl Fixtures {
    /// The standard test data set: 3 topics, 4 users, 6 articles
    #[must_use]
    pub fn standard() -> Self {
        Self {
            topics: vec![
                topic("mitch", "The man, the Mitch, the legend"),
                topic("cats", "Not dogs"),
                topic("paper", "what books are made of"),
            ],
            users: vec![
                user(
                    "butter_bridge",
                    "jonny",
                    "https://www.healthytherapies.com/wp-content/uploads/2016/06/Lime3.jpg",
                ),
                user(
                    "icellusedkars",
                    "sam",
                    "https://avatars2.githubusercontent.com/u/24604688?s=460&v=4",
                ),
                user(
                    "rogersop",
                    "paul",
                    "https://avatars2.githubusercontent.com/u/24394918?s=400&v=4",
                ),
                user(
                    "lurker",
                    "do_nothing",
                    "https://www.golenbock.com/wp-content/uploads/2015/01/placeholder-user.png",
                ),
            ],
            articles: vec![
                article(
                    "Living in the shadow of a great man",
                    "mitch",
                    "butter_bridge",
                    "I find this existence challenging",
                    (2020, 7, 9, 20, 11),
                    100,
                ),
                article(
                    "Sony Vaio; or, The Laptop",
                    "mitch",
                    "icellusedkars",
                    "Call me Mitchell. Some years ago I thought I would buy myself a laptop.",
                    (2020, 10, 16, 5, 3),
                    0,
                ),
                article(
                    "Eight pug gifs that remind me of mitch",
                    "mitch",
                    "icellusedkars",
                    "some gifs",
                    (2020, 11, 3, 9, 12),
                    0,
                ),
                article(
                    "Student SUES Mitch!",
                    "mitch",
                    "rogersop",
                    "We all love Mitch and his wonderful, unique typing style.",
                    (2020, 5, 6, 1, 14),
                    0,
                ),
                article(
                    "UNCOVERED: catspiracy to bring down democracy",
                    "cats",
                    "rogersop",
                    "Bastet walks amongst us, and the cats are taking arms!",
                    (2020, 8, 3, 13, 14),
                    0,
                ),
                article(
                    "A",
                    "mitch",
                    "icellusedkars",
                    "Delicious tin of cat food",
                    (2020, 1, 7, 14, 8),
                    0,
                ),
            ],
        }
    }

    /// Articles as stored, with ids assigned from 1
    #[must_use]
    pub fn stored_articles(&self) -> Vec<Article> {
        self.articles
            .iter()
            .zip(1..)
            .map(|(article, id)| article.with_id(id))
            .collect()
    }
}

/// Drop and recreate the schema, then load `fixtures` in one transaction
///
/// # Errors
///
/// Returns `Error::Database` if any statement fails; a failed load leaves
/// no partially inserted fixtures behind.
pub async fn seed(db: &DatabasePool, fixtures: &Fixtures) -> Result<()> {
    let schema = match db {
        DatabasePool::Sqlite(_) => SQLITE_SCHEMA,
        DatabasePool::Postgres(_) => POSTGRES_SCHEMA,
    };

    with_pool!(db, pool => {
        let mut tx = pool.begin().await?;

        for statement in DROP_TABLES.iter().chain(schema.iter()) {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        for t in &fixtures.topics {
            sqlx::query(INSERT_TOPIC)
                .bind(&t.slug)
                .bind(&t.description)
                .execute(&mut *tx)
                .await?;
        }

        for u in &fixtures.users {
            sqlx::query(INSERT_USER)
                .bind(&u.username)
                .bind(&u.name)
                .bind(&u.avatar_url)
                .execute(&mut *tx)
                .await?;
        }

        for a in &fixtures.articles {
            sqlx::query(INSERT_ARTICLE)
                .bind(&a.title)
                .bind(&a.topic)
                .bind(&a.author)
                .bind(&a.body)
                .bind(a.created_at)
                .bind(a.votes)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
    });

    info!(
        backend = db.backend(),
        topics = fixtures.topics.len(),
        users = fixtures.users.len(),
        articles = fixtures.articles.len(),
        "Database seeded"
    );
    Ok(())
}
