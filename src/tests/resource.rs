use std::sync::Arc;

use axum::http;
use hyper::{Request, StatusCode};
use tower::ServiceExt;

use crate::tests::mock::MockProvider;
use crate::tests::{body_json, establish_session, harness};

#[tokio::test]
async fn upload_stores_and_links_the_object() {
    let mock = Arc::new(
        MockProvider::default()
            .with_user("admin-1", "ops@example.com", "hunter2")
            .with_admin_row("admin-1", true),
    );
    let (app, state) = harness(mock.clone());
    let token = establish_session(&state, "admin-1", "ops@example.com");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/resource/upload?filename=my%20tender%20brief.pdf")
                .method("POST")
                .header("Token", &token)
                .header(http::header::CONTENT_TYPE, mime::APPLICATION_PDF.as_ref())
                .body(vec![0u8; 128].into())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let path = body["path"].as_str().unwrap();
    // timestamp prefix, whitespace collapsed
    assert!(path.ends_with("_my_tender_brief.pdf"));
    assert!(body["public_url"]
        .as_str()
        .unwrap()
        .ends_with(&format!("blog-images/{path}")));

    let uploads = mock.uploads.lock();
    let (bucket, key, content_type, len) = &uploads[0];
    assert_eq!(bucket.as_str(), "blog-images");
    assert_eq!(key.as_str(), path);
    assert_eq!(content_type.as_str(), mime::APPLICATION_PDF.as_ref());
    assert_eq!(*len, 128);
}

#[tokio::test]
async fn upload_is_admin_only() {
    let mock = Arc::new(
        MockProvider::default().with_user("member-1", "alice@example.com", "pw"),
    );
    let (app, state) = harness(mock);
    let token = establish_session(&state, "member-1", "alice@example.com");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/resource/upload?filename=sneaky.png")
                .method("POST")
                .header("Token", &token)
                .body(vec![0u8; 8].into())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
