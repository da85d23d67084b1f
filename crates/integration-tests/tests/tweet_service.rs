use bytes::Bytes;
use domains::{AppError, NewTweet};
use integration_tests::{TestContext, IMAGE_PREFIX};

fn text(content: &str) -> NewTweet {
    NewTweet {
        content: content.into(),
        media_ids: vec![],
    }
}

#[tokio::test]
async fn feed_lists_tweets_in_creation_order_with_authors() {
    let ctx = TestContext::new().await;
    let anton = ctx.seed_user("Anton", "test").await;
    let ivan = ctx.seed_user("Ivan", "test_key").await;

    let first = ctx.service.create_tweet(&anton, text("Hello, World!")).await.unwrap();
    let second = ctx.service.create_tweet(&ivan, text("Hi Anton")).await.unwrap();

    let feed = ctx.service.list_feed().await.unwrap();
    assert_eq!(feed.iter().map(|t| t.id).collect::<Vec<_>>(), vec![first, second]);
    assert_eq!(feed[0].content, "Hello, World!");
    assert_eq!(feed[0].author, anton.summary());
    assert_eq!(feed[1].author, ivan.summary());
    assert!(feed[0].likes.is_empty());
    assert!(feed[0].attachments.is_empty());
}

#[tokio::test]
async fn whitespace_only_tweet_is_rejected() {
    let ctx = TestContext::new().await;
    let anton = ctx.seed_user("Anton", "test").await;

    let err = ctx.service.create_tweet(&anton, text(" \n\t ")).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert!(ctx.service.list_feed().await.unwrap().is_empty());
}

#[tokio::test]
async fn only_the_author_can_delete() {
    let ctx = TestContext::new().await;
    let author = ctx.seed_user("A", "key-a").await;
    let other = ctx.seed_user("B", "key-b").await;
    let tweet_id = ctx.service.create_tweet(&author, text("mine")).await.unwrap();

    let err = ctx.service.delete_tweet(&other, tweet_id).await.unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied));
    assert_eq!(ctx.service.list_feed().await.unwrap().len(), 1);

    ctx.service.delete_tweet(&author, tweet_id).await.unwrap();
    assert!(ctx.service.list_feed().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_missing_tweet_is_denied() {
    let ctx = TestContext::new().await;
    let author = ctx.seed_user("A", "key-a").await;

    let err = ctx.service.delete_tweet(&author, 12345).await.unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied));
}

#[tokio::test]
async fn like_then_unlike_restores_like_count() {
    let ctx = TestContext::new().await;
    let anton = ctx.seed_user("Anton", "k1").await;
    let ivan = ctx.seed_user("Ivan", "k2").await;
    let tweet_id = ctx.service.create_tweet(&anton, text("like me")).await.unwrap();

    ctx.service.like_tweet(&ivan, tweet_id).await.unwrap();
    let feed = ctx.service.list_feed().await.unwrap();
    assert_eq!(feed[0].likes.len(), 1);
    assert_eq!(feed[0].likes[0].user_id, ivan.id);
    assert_eq!(feed[0].likes[0].name, "Ivan");

    ctx.service.unlike_tweet(&ivan, tweet_id).await.unwrap();
    assert!(ctx.service.list_feed().await.unwrap()[0].likes.is_empty());
}

#[tokio::test]
async fn duplicate_like_is_counted_once() {
    let ctx = TestContext::new().await;
    let anton = ctx.seed_user("Anton", "k1").await;
    let tweet_id = ctx.service.create_tweet(&anton, text("again")).await.unwrap();

    ctx.service.like_tweet(&anton, tweet_id).await.unwrap();
    ctx.service.like_tweet(&anton, tweet_id).await.unwrap();

    assert_eq!(ctx.service.list_feed().await.unwrap()[0].likes.len(), 1);
}

#[tokio::test]
async fn liking_a_missing_tweet_is_not_found() {
    let ctx = TestContext::new().await;
    let anton = ctx.seed_user("Anton", "k1").await;

    let err = ctx.service.like_tweet(&anton, 77).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(entity, _) if entity == "Tweet"));
}

#[tokio::test]
async fn unliking_without_a_like_is_not_found() {
    let ctx = TestContext::new().await;
    let anton = ctx.seed_user("Anton", "k1").await;
    let tweet_id = ctx.service.create_tweet(&anton, text("no likes")).await.unwrap();

    let err = ctx.service.unlike_tweet(&anton, tweet_id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(entity, _) if entity == "Like"));
}

#[tokio::test]
async fn uploaded_media_is_attached_and_unknown_ids_ignored() {
    let ctx = TestContext::new().await;
    let anton = ctx.seed_user("Anton", "k1").await;

    let media_id = ctx
        .service
        .attach_media(Bytes::from_static(b"\x89PNG fake"), "cat.png")
        .await
        .unwrap();
    let tweet_id = ctx
        .service
        .create_tweet(
            &anton,
            NewTweet {
                content: "look".into(),
                media_ids: vec![media_id, 9999],
            },
        )
        .await
        .unwrap();

    let feed = ctx.service.list_feed().await.unwrap();
    assert_eq!(feed[0].id, tweet_id);
    assert_eq!(feed[0].attachments.len(), 1);
    assert!(feed[0].attachments[0].starts_with(&format!("{IMAGE_PREFIX}/")));
    assert!(feed[0].attachments[0].ends_with(".png"));
}

#[tokio::test]
async fn attached_media_is_not_relinked_by_another_tweet() {
    let ctx = TestContext::new().await;
    let anton = ctx.seed_user("Anton", "k1").await;
    let media_id = ctx
        .service
        .attach_media(Bytes::from_static(b"gif89a"), "a.gif")
        .await
        .unwrap();

    let with_media = |content: &str| NewTweet {
        content: content.into(),
        media_ids: vec![media_id],
    };
    ctx.service.create_tweet(&anton, with_media("first")).await.unwrap();
    ctx.service.create_tweet(&anton, with_media("second")).await.unwrap();

    let feed = ctx.service.list_feed().await.unwrap();
    assert_eq!(feed[0].attachments.len(), 1);
    assert!(feed[1].attachments.is_empty());
}

#[tokio::test]
async fn deleting_a_tweet_removes_its_likes_and_attachments() {
    let ctx = TestContext::new().await;
    let anton = ctx.seed_user("Anton", "k1").await;
    let ivan = ctx.seed_user("Ivan", "k2").await;

    let media_id = ctx
        .service
        .attach_media(Bytes::from_static(b"jpeg bytes"), "photo.jpg")
        .await
        .unwrap();
    let doomed = ctx
        .service
        .create_tweet(
            &anton,
            NewTweet {
                content: "short-lived".into(),
                media_ids: vec![media_id],
            },
        )
        .await
        .unwrap();
    let kept = ctx.service.create_tweet(&anton, text("stays")).await.unwrap();
    ctx.service.like_tweet(&ivan, doomed).await.unwrap();
    ctx.service.like_tweet(&ivan, kept).await.unwrap();

    ctx.service.delete_tweet(&anton, doomed).await.unwrap();

    let feed = ctx.service.list_feed().await.unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].id, kept);
    assert_eq!(feed[0].likes.len(), 1);
    assert!(feed[0].attachments.is_empty());

    // The like on the deleted tweet went with it.
    let err = ctx.service.unlike_tweet(&ivan, doomed).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(entity, _) if entity == "Tweet"));
}

#[tokio::test]
async fn stored_media_can_be_fetched_back() {
    let ctx = TestContext::new().await;
    let anton = ctx.seed_user("Anton", "k1").await;
    let media_id = ctx
        .service
        .attach_media(Bytes::from_static(b"raw image"), "pic.webp")
        .await
        .unwrap();
    ctx.service
        .create_tweet(
            &anton,
            NewTweet {
                content: "pic".into(),
                media_ids: vec![media_id],
            },
        )
        .await
        .unwrap();

    let url = ctx.service.list_feed().await.unwrap()[0].attachments[0].clone();
    let name = url.rsplit('/').next().unwrap();
    let data = ctx.service.fetch_media(name).await.unwrap();
    assert_eq!(&data[..], b"raw image");
}
