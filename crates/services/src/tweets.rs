//! Tweets, likes and the global feed.

use std::collections::HashMap;

use chrono::Utc;
use domains::ports::StoreTx;
use domains::{
    AppError, AuthoredTweet, FeedEntry, Image, LikeRecord, LikeView, NewTweet, Result, TweetId,
    User,
};
use tracing::{debug, info, instrument, warn};

use crate::MicroblogService;

impl MicroblogService {
    /// Publishes a tweet and links any listed media that is still detached.
    /// Unknown or already-claimed media ids are ignored.
    #[instrument(skip(self, author, new_tweet), fields(author_id = author.id))]
    pub async fn create_tweet(&self, author: &User, new_tweet: NewTweet) -> Result<TweetId> {
        if new_tweet.content.trim().is_empty() {
            return Err(AppError::ValidationError(
                "tweet content must not be empty".into(),
            ));
        }

        let mut tx = self.store.begin_write().await?;
        let tweet_id = tx
            .insert_tweet(author.id, &new_tweet.content, Utc::now())
            .await?;

        let mut linked = 0usize;
        for &media_id in &new_tweet.media_ids {
            if tx.link_image(media_id, tweet_id).await? {
                linked += 1;
            } else {
                debug!(media_id, "media id skipped");
            }
        }

        tx.commit().await?;
        info!(tweet_id, linked, "tweet created");
        Ok(tweet_id)
    }

    /// Deletes a tweet owned by `requester`. A missing tweet and a tweet
    /// owned by someone else produce the same denial.
    #[instrument(skip(self, requester), fields(requester_id = requester.id))]
    pub async fn delete_tweet(&self, requester: &User, tweet_id: TweetId) -> Result<()> {
        let mut tx = self.store.begin_write().await?;
        match tx.tweet_by_id(tweet_id).await? {
            Some(tweet) if tweet.author_id == requester.id => {}
            _ => {
                warn!("tweet deletion denied");
                return Err(AppError::PermissionDenied);
            }
        }

        tx.delete_tweet(tweet_id).await?;
        tx.commit().await?;
        info!("tweet deleted");
        Ok(())
    }

    /// Every tweet in creation order with author, likes and attachments
    /// resolved.
    #[instrument(skip(self))]
    pub async fn list_feed(&self) -> Result<Vec<FeedEntry>> {
        let mut tx = self.store.begin().await?;
        let tweets = tx.list_tweets().await?;
        let images = tx.list_attached_images().await?;
        let likes = tx.list_likes().await?;
        Ok(assemble_feed(tweets, images, likes))
    }

    /// Marks the tweet as liked by `user`. Liking twice keeps a single like.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn like_tweet(&self, user: &User, tweet_id: TweetId) -> Result<()> {
        let mut tx = self.store.begin_write().await?;
        ensure_tweet(&mut *tx, tweet_id).await?;
        if !tx.insert_like(user.id, tweet_id).await? {
            debug!("tweet already liked");
        }
        tx.commit().await?;
        Ok(())
    }

    /// Removes the user's like from the tweet; fails if there is none.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn unlike_tweet(&self, user: &User, tweet_id: TweetId) -> Result<()> {
        let mut tx = self.store.begin_write().await?;
        ensure_tweet(&mut *tx, tweet_id).await?;
        if !tx.delete_like(user.id, tweet_id).await? {
            return Err(AppError::not_found(
                "Like",
                format!("{}:{}", user.id, tweet_id),
            ));
        }
        tx.commit().await?;
        Ok(())
    }
}

async fn ensure_tweet(tx: &mut dyn StoreTx, tweet_id: TweetId) -> Result<()> {
    match tx.tweet_by_id(tweet_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::not_found("Tweet", tweet_id)),
    }
}

/// Groups attachments and likes under their tweets, keeping the order of
/// `tweets` and the store order within each group.
fn assemble_feed(
    tweets: Vec<AuthoredTweet>,
    images: Vec<Image>,
    likes: Vec<LikeRecord>,
) -> Vec<FeedEntry> {
    let mut attachments: HashMap<TweetId, Vec<String>> = HashMap::new();
    for image in images {
        if let Some(tweet_id) = image.tweet_id {
            attachments.entry(tweet_id).or_default().push(image.url);
        }
    }

    let mut likes_by_tweet: HashMap<TweetId, Vec<LikeView>> = HashMap::new();
    for like in likes {
        likes_by_tweet
            .entry(like.tweet_id)
            .or_default()
            .push(like.user.into());
    }

    tweets
        .into_iter()
        .map(|AuthoredTweet { tweet, author }| FeedEntry {
            id: tweet.id,
            attachments: attachments.remove(&tweet.id).unwrap_or_default(),
            likes: likes_by_tweet.remove(&tweet.id).unwrap_or_default(),
            content: tweet.content,
            author,
        })
        .collect()
}
