//! # Domain Models
//!
//! These structs represent the core entities of the microblog and the
//! read-side projections the service assembles from them.
//! Identifiers are system-assigned integers handed out by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type TweetId = i64;
pub type ImageId = i64;

/// A registered account, identified to the API by its `api_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    /// Display name, not unique.
    pub name: String,
    /// Bearer credential. Never serialized into responses.
    #[serde(skip_serializing)]
    pub api_key: String,
}

impl User {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// The `{id, name}` pair used wherever another user is referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
}

/// A user together with both directions of the follow relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    /// Users following this user.
    pub followers: Vec<UserSummary>,
    /// Users this user follows.
    pub following: Vec<UserSummary>,
}

/// The fundamental unit of conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: TweetId,
    pub author_id: UserId,
    pub content: String,
    /// Assigned by the service at creation, never by the client.
    pub created_at: DateTime<Utc>,
}

/// A stored upload. Detached (`tweet_id == None`) until a tweet claims it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,
    /// Public URL handed out by the `MediaStore`.
    pub url: String,
    pub tweet_id: Option<TweetId>,
}

/// A tweet row joined with its author, as read back for the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoredTweet {
    pub tweet: Tweet,
    pub author: UserSummary,
}

/// A like row joined with the liking user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeRecord {
    pub tweet_id: TweetId,
    pub user: UserSummary,
}

/// A like as rendered in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeView {
    pub user_id: UserId,
    pub name: String,
}

impl From<UserSummary> for LikeView {
    fn from(user: UserSummary) -> Self {
        Self {
            user_id: user.id,
            name: user.name,
        }
    }
}

/// One tweet of the global feed with everything resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: TweetId,
    pub content: String,
    /// URLs of the attached images, in upload order.
    pub attachments: Vec<String>,
    pub author: UserSummary,
    pub likes: Vec<LikeView>,
}

/// Input for tweet creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewTweet {
    pub content: String,
    /// Ids of previously uploaded images to attach. Unknown ids are ignored.
    #[serde(default)]
    pub media_ids: Vec<ImageId>,
}
