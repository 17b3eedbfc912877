
mod membership;
mod resource;

use std::sync::Arc;

use axum::http;
use hyper::Request;

use crate::provider::{AuthSession, AuthUser};
use crate::Global;
use mock::{access_token, MockProvider};

/// Build a router plus the state behind it, sharing the given mock.
fn harness(provider: Arc<MockProvider>) -> (axum::Router, Global) {
    let state = Global::new(provider);
    (crate::router(state.clone()), state)
}

/// Insert a live session for `user_id` directly into the store and
/// hand back its gateway token.
fn establish_session(state: &Global, user_id: &str, email: &str) -> String {
    establish_session_with_expiry(state, user_id, email, 3600)
}

fn establish_session_with_expiry(
    state: &Global,
    user_id: &str,
    email: &str,
    expires_in: i64,
) -> String {
    let user = AuthUser {
        id: user_id.to_string(),
        email: email.to_string(),
        created_at: None,
    };
    let auth = AuthSession {
        access_token: access_token(user_id),
        refresh_token: format!("rt-{user_id}"),
        expires_in,
        user: Some(user.clone()),
    };
    state.sessions.insert(&user, &auth)
}

fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<hyper::Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method("POST")
        .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
    if let Some(token) = token {
        builder = builder.header("Token", token);
    }
    builder
        .body(serde_json::to_vec(&body).unwrap().into())
        .unwrap()
}

fn post_empty(uri: &str, token: Option<&str>) -> Request<hyper::Body> {
    let mut builder = Request::builder().uri(uri).method("POST");
    if let Some(token) = token {
        builder = builder.header("Token", token);
    }
    builder.body(hyper::Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&hyper::body::to_bytes(response.into_body()).await.unwrap()).unwrap()
}
