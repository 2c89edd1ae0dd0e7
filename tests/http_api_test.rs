// ABOUTME: End-to-end tests for the HTTP surface exposed to the UI/backend glue
// ABOUTME: Runs the real router on an ephemeral port and drives it with an HTTP client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use adbridge::routes;
use chrono::{Duration, Utc};
use common::{seed_credential, setup, TestHarness};
use serde_json::{json, Value};
use std::sync::Arc;

/// Serve the application router in the background, returning its base URL
async fn serve(harness: &TestHarness) -> String {
    let app = routes::router(Arc::clone(&harness.resources));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind server listener");
    let addr = listener.local_addr().expect("Missing local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server died");
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let harness = setup().await;
    let base = serve(&harness).await;

    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .expect("Request failed")
        .json()
        .await
        .expect("Invalid JSON");

    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn exchange_endpoint_returns_credential_and_profile() {
    let harness = setup().await;
    let base = serve(&harness).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/connections/exchange"))
        .json(&json!({
            "code": "auth-code-1",
            "advertiser_id": harness.advertiser_id,
            "redirect_uri": "https://app/callback",
        }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Invalid JSON");
    assert!(body["credential_id"].is_string());
    assert_eq!(body["profile_id"], "111222");
}

#[tokio::test]
async fn rejected_exchange_maps_to_unauthorized_with_reconnect_hint() {
    let harness = setup().await;
    harness
        .provider
        .push_exchange_reply(400, json!({"error": "invalid_grant"}));
    let base = serve(&harness).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/connections/exchange"))
        .json(&json!({
            "code": "reused-code",
            "advertiser_id": harness.advertiser_id,
            "redirect_uri": "https://app/callback",
        }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["error"]["code"], "external_auth_error");
    assert_eq!(body["error"]["needs_reauthorization"], true);
}

#[tokio::test]
async fn token_endpoint_returns_the_stored_grant() {
    let harness = setup().await;
    let expires_at = Utc::now() + Duration::seconds(3600);
    let credential_id =
        seed_credential(&harness, Some("at1"), Some("rt1"), Some(expires_at)).await;
    let base = serve(&harness).await;

    let body: Value = reqwest::get(format!("{base}/api/credentials/{credential_id}/token"))
        .await
        .expect("Request failed")
        .json()
        .await
        .expect("Invalid JSON");

    assert_eq!(body["access_token"], "at1");
    assert_eq!(body["profile_id"], "111222");
}

#[tokio::test]
async fn token_endpoint_maps_unknown_credential_to_not_found() {
    let harness = setup().await;
    let base = serve(&harness).await;

    let response = reqwest::get(format!("{base}/api/credentials/nope/token"))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn invoke_endpoint_proxies_the_provider_response() {
    let harness = setup().await;
    let expires_at = Utc::now() + Duration::seconds(3600);
    let credential_id =
        seed_credential(&harness, Some("at1"), Some("rt1"), Some(expires_at)).await;
    harness
        .provider
        .push_api_reply(200, json!({"campaigns": [{"campaignId": 7}]}));
    let base = serve(&harness).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/credentials/{credential_id}/invoke"))
        .json(&json!({
            "operation": "list_campaigns",
            "method": "GET",
            "path": "/v2/sp/campaigns",
        }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["status"], 200);
    assert_eq!(body["body"]["campaigns"][0]["campaignId"], 7);
}

#[tokio::test]
async fn invoke_endpoint_rejects_unknown_operations() {
    let harness = setup().await;
    let expires_at = Utc::now() + Duration::seconds(3600);
    let credential_id =
        seed_credential(&harness, Some("at1"), Some("rt1"), Some(expires_at)).await;
    let base = serve(&harness).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/credentials/{credential_id}/invoke"))
        .json(&json!({
            "operation": "drop_tables",
            "method": "GET",
            "path": "/v2/sp/campaigns",
        }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn status_endpoint_distinguishes_connected_from_expired() {
    let harness = setup().await;
    let base = serve(&harness).await;

    let fresh_id = seed_credential(
        &harness,
        Some("at1"),
        Some("rt1"),
        Some(Utc::now() + Duration::seconds(3600)),
    )
    .await;
    let body: Value = reqwest::get(format!("{base}/api/credentials/{fresh_id}/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "connected");

    // Expire the same credential in place
    sqlx::query("UPDATE platform_credentials SET token_expires_at = $2 WHERE id = $1")
        .bind(&fresh_id)
        .bind(Utc::now() - Duration::seconds(10))
        .execute(harness.resources.database.pool())
        .await
        .unwrap();
    let body: Value = reqwest::get(format!("{base}/api/credentials/{fresh_id}/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "token_expired");
}

#[tokio::test]
async fn operations_endpoint_lists_the_audit_trail() {
    let harness = setup().await;
    let base = serve(&harness).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/connections/exchange"))
        .json(&json!({
            "code": "auth-code-1",
            "advertiser_id": harness.advertiser_id,
            "redirect_uri": "https://app/callback",
        }))
        .send()
        .await
        .expect("Request failed");
    let exchange: Value = response.json().await.unwrap();
    let credential_id = exchange["credential_id"].as_str().unwrap();

    let body: Value = reqwest::get(format!(
        "{base}/api/credentials/{credential_id}/operations?limit=10"
    ))
    .await
    .unwrap()
    .json()
    .await
    .unwrap();

    let entries = body.as_array().expect("Expected an array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["operation_type"], "initial_connection");
    assert_eq!(entries[0]["status"], "success");
}
