//! # SQLite Store
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `domains` models. Referential integrity and cascades are enforced by
//! the schema in `migrations/`, so deleting a tweet here is a single statement.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::models::{
    AuthoredTweet, Image, ImageId, LikeRecord, Tweet, TweetId, User, UserId, UserSummary,
};
use domains::ports::{Store, StoreTx};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Row, Sqlite, SqliteConnection, Transaction};
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `url` and brings the schema
    /// up to date.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .context("invalid SQLite connection string")?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("connecting to SQLite")?;

        Self::from_pool(pool).await
    }

    /// A private in-memory database. Every connection to `:memory:` opens a
    /// separate database, so the pool is pinned to one long-lived connection.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> anyhow::Result<Self> {
        MIGRATOR.run(&pool).await.context("running migrations")?;
        info!("database schema is up to date");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn begin(&self) -> anyhow::Result<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteTx { tx: Some(tx) }))
    }

    /// A deferred transaction that has read is refused the upgrade to a
    /// writer with `SQLITE_BUSY_SNAPSHOT` once another writer commits, and
    /// `busy_timeout` does not apply. `BEGIN IMMEDIATE` waits for the lock
    /// instead.
    async fn begin_write(&self) -> anyhow::Result<Box<dyn StoreTx>> {
        let tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;
        Ok(Box::new(SqliteTx { tx: Some(tx) }))
    }
}

/// One open transaction. Dropping it without `commit` rolls back.
struct SqliteTx {
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteTx {
    fn conn(&mut self) -> anyhow::Result<&mut SqliteConnection> {
        self.tx
            .as_deref_mut()
            .ok_or_else(|| anyhow!("transaction already committed"))
    }
}

fn row_to_user(row: &SqliteRow) -> anyhow::Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        api_key: row.try_get("api_key")?,
    })
}

fn row_to_summary(row: &SqliteRow) -> anyhow::Result<UserSummary> {
    Ok(UserSummary {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

fn row_to_tweet(row: &SqliteRow) -> anyhow::Result<Tweet> {
    Ok(Tweet {
        id: row.try_get("id")?,
        author_id: row.try_get("user_id")?,
        content: row.try_get("content")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[async_trait]
impl StoreTx for SqliteTx {
    async fn user_by_api_key(&mut self, api_key: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, api_key FROM users WHERE api_key = ?")
            .bind(api_key)
            .fetch_optional(self.conn()?)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    async fn user_by_id(&mut self, id: UserId) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, api_key FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        row.as_ref().map(row_to_user).transpose()
    }

    /// A concurrent first request with the same key makes the insert a no-op;
    /// the follow-up select then returns that request's row.
    async fn insert_user(&mut self, name: &str, api_key: &str) -> anyhow::Result<User> {
        sqlx::query(
            "INSERT INTO users (name, api_key) VALUES (?, ?) \
             ON CONFLICT (api_key) DO NOTHING",
        )
        .bind(name)
        .bind(api_key)
        .execute(self.conn()?)
        .await?;

        self.user_by_api_key(api_key)
            .await?
            .ok_or_else(|| anyhow!("user row missing right after insert"))
    }

    async fn followers_of(&mut self, id: UserId) -> anyhow::Result<Vec<UserSummary>> {
        sqlx::query(
            "SELECT u.id, u.name FROM follows f \
             JOIN users u ON u.id = f.subscriber_id \
             WHERE f.following_id = ? ORDER BY u.id",
        )
        .bind(id)
        .fetch_all(self.conn()?)
        .await?
        .iter()
        .map(row_to_summary)
        .collect()
    }

    async fn following_of(&mut self, id: UserId) -> anyhow::Result<Vec<UserSummary>> {
        sqlx::query(
            "SELECT u.id, u.name FROM follows f \
             JOIN users u ON u.id = f.following_id \
             WHERE f.subscriber_id = ? ORDER BY u.id",
        )
        .bind(id)
        .fetch_all(self.conn()?)
        .await?
        .iter()
        .map(row_to_summary)
        .collect()
    }

    async fn insert_follow(
        &mut self,
        subscriber: UserId,
        following: UserId,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "INSERT INTO follows (subscriber_id, following_id) VALUES (?, ?) \
             ON CONFLICT DO NOTHING",
        )
        .bind(subscriber)
        .bind(following)
        .execute(self.conn()?)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_follow(
        &mut self,
        subscriber: UserId,
        following: UserId,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE subscriber_id = ? AND following_id = ?")
            .bind(subscriber)
            .bind(following)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_tweet(
        &mut self,
        author: UserId,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> anyhow::Result<TweetId> {
        let result =
            sqlx::query("INSERT INTO tweets (content, created_at, user_id) VALUES (?, ?, ?)")
                .bind(content)
                .bind(created_at)
                .bind(author)
                .execute(self.conn()?)
                .await?;
        Ok(result.last_insert_rowid())
    }

    async fn tweet_by_id(&mut self, id: TweetId) -> anyhow::Result<Option<Tweet>> {
        let row = sqlx::query("SELECT id, user_id, content, created_at FROM tweets WHERE id = ?")
            .bind(id)
            .fetch_optional(self.conn()?)
            .await?;
        row.as_ref().map(row_to_tweet).transpose()
    }

    async fn delete_tweet(&mut self, id: TweetId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM tweets WHERE id = ?")
            .bind(id)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_tweets(&mut self) -> anyhow::Result<Vec<AuthoredTweet>> {
        sqlx::query(
            "SELECT t.id, t.user_id, t.content, t.created_at, u.name AS author_name \
             FROM tweets t JOIN users u ON u.id = t.user_id ORDER BY t.id",
        )
        .fetch_all(self.conn()?)
        .await?
        .iter()
        .map(|row| -> anyhow::Result<AuthoredTweet> {
            let tweet = row_to_tweet(row)?;
            let author = UserSummary {
                id: tweet.author_id,
                name: row.try_get("author_name")?,
            };
            Ok(AuthoredTweet { tweet, author })
        })
        .collect()
    }

    async fn insert_like(&mut self, user: UserId, tweet: TweetId) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "INSERT INTO likes (user_id, tweet_id) VALUES (?, ?) \
             ON CONFLICT (user_id, tweet_id) DO NOTHING",
        )
        .bind(user)
        .bind(tweet)
        .execute(self.conn()?)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_like(&mut self, user: UserId, tweet: TweetId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = ? AND tweet_id = ?")
            .bind(user)
            .bind(tweet)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_likes(&mut self) -> anyhow::Result<Vec<LikeRecord>> {
        sqlx::query(
            "SELECT l.tweet_id, u.id, u.name FROM likes l \
             JOIN users u ON u.id = l.user_id ORDER BY l.id",
        )
        .fetch_all(self.conn()?)
        .await?
        .iter()
        .map(|row| -> anyhow::Result<LikeRecord> {
            Ok(LikeRecord {
                tweet_id: row.try_get("tweet_id")?,
                user: row_to_summary(row)?,
            })
        })
        .collect()
    }

    async fn insert_image(&mut self, url: &str) -> anyhow::Result<ImageId> {
        let result = sqlx::query("INSERT INTO images (url) VALUES (?)")
            .bind(url)
            .execute(self.conn()?)
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn link_image(&mut self, image: ImageId, tweet: TweetId) -> anyhow::Result<bool> {
        let result = sqlx::query("UPDATE images SET tweet_id = ? WHERE id = ? AND tweet_id IS NULL")
            .bind(tweet)
            .bind(image)
            .execute(self.conn()?)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_attached_images(&mut self) -> anyhow::Result<Vec<Image>> {
        sqlx::query("SELECT id, url, tweet_id FROM images WHERE tweet_id IS NOT NULL ORDER BY id")
            .fetch_all(self.conn()?)
            .await?
            .iter()
            .map(|row| -> anyhow::Result<Image> {
                Ok(Image {
                    id: row.try_get("id")?,
                    url: row.try_get("url")?,
                    tweet_id: row.try_get("tweet_id")?,
                })
            })
            .collect()
    }

    async fn commit(&mut self) -> anyhow::Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| anyhow!("transaction already committed"))?;
        tx.commit().await?;
        Ok(())
    }
}
