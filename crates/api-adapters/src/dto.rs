//! Request and response bodies of the JSON API.
//!
//! Every successful response carries `"result": true`; failures are
//! rendered by [`crate::error::ApiError`].

use domains::{FeedEntry, ImageId, NewTweet, TweetId, UserProfile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct Ack {
    pub result: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { result: true }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub result: bool,
    pub user: UserProfile,
}

impl UserResponse {
    pub fn new(user: UserProfile) -> Self {
        Self { result: true, user }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub result: bool,
    pub tweets: Vec<FeedEntry>,
}

impl FeedResponse {
    pub fn new(tweets: Vec<FeedEntry>) -> Self {
        Self { result: true, tweets }
    }
}

#[derive(Debug, Serialize)]
pub struct TweetCreated {
    pub result: bool,
    pub tweet_id: TweetId,
}

impl TweetCreated {
    pub fn new(tweet_id: TweetId) -> Self {
        Self { result: true, tweet_id }
    }
}

#[derive(Debug, Serialize)]
pub struct MediaCreated {
    pub result: bool,
    pub media_id: ImageId,
}

impl MediaCreated {
    pub fn new(media_id: ImageId) -> Self {
        Self { result: true, media_id }
    }
}

/// Body of `POST /api/tweets`.
#[derive(Debug, Deserialize)]
pub struct CreateTweetRequest {
    pub tweet_data: String,
    #[serde(default)]
    pub tweet_media_ids: Vec<ImageId>,
}

impl From<CreateTweetRequest> for NewTweet {
    fn from(req: CreateTweetRequest) -> Self {
        NewTweet {
            content: req.tweet_data,
            media_ids: req.tweet_media_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn media_ids_are_optional() {
        let req: CreateTweetRequest =
            serde_json::from_value(json!({ "tweet_data": "hello" })).unwrap();
        let tweet = NewTweet::from(req);
        assert_eq!(tweet.content, "hello");
        assert!(tweet.media_ids.is_empty());
    }

    #[test]
    fn created_bodies_carry_the_new_id() {
        assert_eq!(
            serde_json::to_value(TweetCreated::new(7)).unwrap(),
            json!({ "result": true, "tweet_id": 7 })
        );
        assert_eq!(
            serde_json::to_value(MediaCreated::new(3)).unwrap(),
            json!({ "result": true, "media_id": 3 })
        );
    }
}
