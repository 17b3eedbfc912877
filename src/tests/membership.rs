use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use hyper::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use tenderdesk_shared::membership::{expiry_display, ExpiryDisplay, MembershipType};

use crate::tests::mock::MockProvider;
use crate::tests::{body_json, establish_session, harness, post_empty, post_json};

fn populated_mock() -> MockProvider {
    MockProvider::default()
        .with_user("admin-1", "ops@example.com", "hunter2")
        .with_admin_row("admin-1", true)
        .with_user("member-1", "alice@example.com", "pw")
        .with_admin_row("member-1", false)
        .with_user("member-2", "bob@example.com", "pw")
}

fn listed_ids(body: &serde_json::Value) -> Vec<&str> {
    body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn list_excludes_admins_and_the_operator() {
    let mock = Arc::new(populated_mock());
    let (app, state) = harness(mock);
    let token = establish_session(&state, "admin-1", "ops@example.com");

    let response = app
        .oneshot(post_empty("/api/users/list", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let ids = listed_ids(&body);
    assert_eq!(ids, vec!["member-1", "member-2"]);
}

#[tokio::test]
async fn list_requires_an_admin() {
    let mock = Arc::new(populated_mock());
    let (app, state) = harness(mock);
    let token = establish_session(&state, "member-1", "alice@example.com");

    let response = app
        .oneshot(post_empty("/api/users/list", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_falls_back_to_enumeration() {
    let mock = Arc::new(populated_mock());
    mock.fail_joined_view.store(true, Ordering::Relaxed);
    let (app, state) = harness(mock.clone());
    let token = establish_session(&state, "admin-1", "ops@example.com");

    let response = app
        .oneshot(post_empty("/api/users/list", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(listed_ids(&body), vec!["member-1", "member-2"]);

    // one lookup per non-operator user, the known O(n) degradation
    let lookups = mock.lookup_calls.lock();
    let member_lookups: Vec<_> = lookups
        .iter()
        .filter(|id| id.starts_with("member-"))
        .collect();
    assert_eq!(member_lookups.len(), 2);
}

#[tokio::test]
async fn fallback_tolerates_per_user_lookup_errors() {
    let mock = Arc::new(populated_mock());
    mock.fail_joined_view.store(true, Ordering::Relaxed);
    let (app, state) = harness(mock.clone());
    let token = establish_session(&state, "admin-1", "ops@example.com");

    // admin verification still answers through its first tier; only
    // the per-user lookups error
    mock.fail_admin_lookup.store(true, Ordering::Relaxed);
    let response = app
        .oneshot(post_empty("/api/users/list", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // lookups errored for everyone: users are listed with no
    // membership data rather than dropped
    let rows = body["users"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row["membership_type"].is_null()));
}

#[tokio::test]
async fn update_then_list_shows_the_new_tier() {
    let mock = Arc::new(populated_mock());
    let (app, state) = harness(mock.clone());
    let token = establish_session(&state, "admin-1", "ops@example.com");

    let response = app
        .oneshot(post_json(
            "/api/users/membership",
            Some(&token),
            json!({ "user_id": "member-1", "membership_type": "Student" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let row = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["id"] == "member-1")
        .unwrap();
    assert_eq!(row["membership_type"], "Student");
    assert_eq!(
        *mock.membership_update_calls.lock(),
        vec![("member-1".to_string(), MembershipType::Student)]
    );
    assert_eq!(MembershipType::Student.description(), "₹750 + GST / Year");
}

#[tokio::test]
async fn update_failure_leaves_prior_value() {
    let mock = Arc::new(populated_mock());
    let (app, state) = harness(mock.clone());
    let token = establish_session(&state, "admin-1", "ops@example.com");

    mock.admin_rows
        .write()
        .get_mut("member-1")
        .unwrap()
        .membership_type = Some(MembershipType::Corporate);
    mock.fail_membership_update.store(true, Ordering::Relaxed);

    let response = app
        .oneshot(post_json(
            "/api/users/membership",
            Some(&token),
            json!({ "user_id": "member-1", "membership_type": "Student" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    // never retried, value untouched
    assert!(mock.membership_update_calls.lock().is_empty());
    assert_eq!(
        mock.admin_rows.read()["member-1"].membership_type,
        Some(MembershipType::Corporate)
    );
}

#[tokio::test]
async fn concurrent_updates_to_one_row_are_rejected() {
    let mock = Arc::new(populated_mock());
    let (app, state) = harness(mock);
    let token = establish_session(&state, "admin-1", "ops@example.com");

    // first update still in flight
    let guard = state.membership_updates.begin("member-1").unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/users/membership",
            Some(&token),
            json!({ "user_id": "member-1", "membership_type": "Student" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // a different row is not coordinated with it
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/users/membership",
            Some(&token),
            json!({ "user_id": "member-2", "membership_type": "Corporate" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // once the first resolves, the row accepts updates again
    drop(guard);
    let response = app
        .oneshot(post_json(
            "/api/users/membership",
            Some(&token),
            json!({ "user_id": "member-1", "membership_type": "Student" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn tier_serialization_uses_display_strings() {
    assert_eq!(
        serde_json::to_value(MembershipType::IndividualInternational).unwrap(),
        json!("Individual International")
    );
    assert_eq!(
        serde_json::to_value(MembershipType::CharterOrLifetime).unwrap(),
        json!("Charter or Lifetime")
    );
    assert_eq!(
        MembershipType::CharterOrLifetime.description(),
        "₹1,00,000 + GST"
    );
    assert_eq!(MembershipType::ALL.len(), 6);
}

#[test]
fn expiry_presentation() {
    let now = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();

    assert_eq!(expiry_display(None, now), ExpiryDisplay::NeverExpires);
    assert_eq!(expiry_display(None, now).to_string(), "Never Expires");

    let yesterday = now - Duration::days(1);
    assert_eq!(expiry_display(Some(yesterday), now), ExpiryDisplay::Expired);

    let next_year = Utc.with_ymd_and_hms(2027, 3, 5, 0, 0, 0).unwrap();
    assert_eq!(
        expiry_display(Some(next_year), now),
        ExpiryDisplay::Date("Mar 5, 2027".to_string())
    );
}
