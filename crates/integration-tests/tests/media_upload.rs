use axum::http::{header, StatusCode};
use integration_tests::{TestApp, IMAGE_PREFIX, MAX_UPLOAD_BYTES};
use serde_json::json;

#[tokio::test]
async fn upload_attach_and_serve() {
    let app = TestApp::new().await;
    app.seed_user("Anton", "test").await;

    let (status, body) = app.upload(Some("test"), "file", "cat.png", b"\x89PNG not really").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["result"], json!(true));
    let media_id = body["media_id"].as_i64().unwrap();

    let (status, body) = app
        .post(
            "/api/tweets",
            Some("test"),
            Some(json!({ "tweet_data": "my cat", "tweet_media_ids": [media_id, 404] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["tweet_id"].is_i64());

    let (_, feed) = app.get("/api/tweets", Some("test")).await;
    let attachments = feed["tweets"][0]["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 1);
    let url = attachments[0].as_str().unwrap();
    assert!(url.starts_with(&format!("{IMAGE_PREFIX}/")));

    let (status, headers, data) = app.get_raw(url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(&data[..], b"\x89PNG not really");
}

#[tokio::test]
async fn upload_requires_a_credential() {
    let app = TestApp::new().await;

    let (status, body) = app.upload(None, "file", "a.png", b"bytes").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "MissingCredential");
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let app = TestApp::new().await;
    app.seed_user("Anton", "test").await;

    let (status, body) = app.upload(Some("test"), "picture", "a.png", b"bytes").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "ValidationError");
}

#[tokio::test]
async fn empty_upload_is_rejected() {
    let app = TestApp::new().await;
    app.seed_user("Anton", "test").await;

    let (status, body) = app.upload(Some("test"), "file", "empty.png", b"").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "ValidationError");
}

#[tokio::test]
async fn oversized_upload_is_refused() {
    let app = TestApp::new().await;
    app.seed_user("Anton", "test").await;

    let data = vec![7u8; MAX_UPLOAD_BYTES * 2];
    let (status, _) = app.upload(Some("test"), "file", "big.bin", &data).await;
    assert!(status.is_client_error(), "unexpected status {status}");
}

#[tokio::test]
async fn unknown_image_is_not_found() {
    let app = TestApp::new().await;

    let (status, _, body) = app
        .get_raw(&format!("{IMAGE_PREFIX}/{}.png", "0".repeat(64)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error_type"], "NotFound");
}

#[tokio::test]
async fn same_file_twice_gets_two_media_ids() {
    let app = TestApp::new().await;
    app.seed_user("Anton", "test").await;

    let (_, first) = app.upload(Some("test"), "file", "a.gif", b"GIF89a").await;
    let (_, second) = app.upload(Some("test"), "file", "a.gif", b"GIF89a").await;
    assert_ne!(first["media_id"], second["media_id"]);
}
