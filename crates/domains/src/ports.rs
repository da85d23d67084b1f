//! # Ports
//!
//! Storage adapters implement these traits; the service only talks to them.
//! `Store` hands out one `StoreTx` per operation. Dropping a `StoreTx`
//! without calling `commit` rolls back everything done through it.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::models::{
    AuthoredTweet, Image, ImageId, LikeRecord, Tweet, TweetId, User, UserId, UserSummary,
};

/// Entry point to the relational store.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    /// Opens a transaction scoped to a single read-only service operation.
    async fn begin(&self) -> anyhow::Result<Box<dyn StoreTx>>;

    /// Opens a transaction for an operation that writes. The write lock is
    /// taken up front, so a writer committing between this transaction's
    /// reads and its writes cannot make it fail.
    async fn begin_write(&self) -> anyhow::Result<Box<dyn StoreTx>>;
}

/// Transaction-scoped data access for users, tweets, likes, images and the
/// follow relation.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait StoreTx: Send {
    // User Operations
    async fn user_by_api_key(&mut self, api_key: &str) -> anyhow::Result<Option<User>>;
    async fn user_by_id(&mut self, id: UserId) -> anyhow::Result<Option<User>>;
    /// Inserts a user unless the key is taken; returns whichever row owns the key.
    async fn insert_user(&mut self, name: &str, api_key: &str) -> anyhow::Result<User>;

    // Follow relation
    async fn followers_of(&mut self, id: UserId) -> anyhow::Result<Vec<UserSummary>>;
    async fn following_of(&mut self, id: UserId) -> anyhow::Result<Vec<UserSummary>>;
    /// Returns `false` when the pair was already present.
    async fn insert_follow(
        &mut self,
        subscriber: UserId,
        following: UserId,
    ) -> anyhow::Result<bool>;
    /// Returns `false` when there was nothing to remove.
    async fn delete_follow(
        &mut self,
        subscriber: UserId,
        following: UserId,
    ) -> anyhow::Result<bool>;

    // Tweet Operations
    async fn insert_tweet(
        &mut self,
        author: UserId,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> anyhow::Result<TweetId>;
    async fn tweet_by_id(&mut self, id: TweetId) -> anyhow::Result<Option<Tweet>>;
    /// Deletes the tweet; its likes and images go with it.
    async fn delete_tweet(&mut self, id: TweetId) -> anyhow::Result<bool>;
    /// All tweets with their authors, in creation order.
    async fn list_tweets(&mut self) -> anyhow::Result<Vec<AuthoredTweet>>;

    // Like Operations
    /// Returns `false` when the user already liked the tweet.
    async fn insert_like(&mut self, user: UserId, tweet: TweetId) -> anyhow::Result<bool>;
    async fn delete_like(&mut self, user: UserId, tweet: TweetId) -> anyhow::Result<bool>;
    async fn list_likes(&mut self) -> anyhow::Result<Vec<LikeRecord>>;

    // Image Operations
    async fn insert_image(&mut self, url: &str) -> anyhow::Result<ImageId>;
    /// Links a detached image to a tweet. Returns `false` if the image is
    /// unknown or already linked.
    async fn link_image(&mut self, image: ImageId, tweet: TweetId) -> anyhow::Result<bool>;
    /// All images attached to some tweet, in upload order.
    async fn list_attached_images(&mut self) -> anyhow::Result<Vec<Image>>;

    /// Makes every change done through this handle visible. The handle is
    /// spent afterwards.
    async fn commit(&mut self) -> anyhow::Result<()>;
}

/// Media storage contract for uploaded attachments.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Saves raw bytes and returns the stored object's name.
    async fn save_upload(&self, data: Bytes, filename: &str) -> anyhow::Result<String>;
    /// Returns the public URL under which `name` is served.
    fn url_for(&self, name: &str) -> String;
    /// Reads a stored object back. `Ok(None)` if it does not exist.
    async fn load(&self, name: &str) -> anyhow::Result<Option<Bytes>>;
}
