// ABOUTME: Shared test utilities: mock provider server and resource harness
// ABOUTME: Provides in-memory database setup and scripted provider responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(dead_code)]

//! Shared test utilities for `adbridge`
//!
//! The mock provider is a real axum server bound to an ephemeral local port.
//! Its token, profile, and API endpoints count invocations and replay
//! scripted responses, letting tests assert exact network call counts.

use adbridge::config::{ProviderConfig, RetryConfig, ServerConfig};
use adbridge::context::ServerResources;
use adbridge::database::{CredentialTokens, Database};
use adbridge_core::models::AdvertiserId;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Scripted provider endpoints with invocation counters
#[derive(Default)]
pub struct MockState {
    pub exchange_calls: AtomicU32,
    pub refresh_calls: AtomicU32,
    pub profile_calls: AtomicU32,
    pub api_calls: AtomicU32,
    exchange_replies: Mutex<VecDeque<(u16, Value)>>,
    refresh_replies: Mutex<VecDeque<(u16, Value)>>,
    api_replies: Mutex<VecDeque<(u16, Value)>>,
    profiles: Mutex<Value>,
}

/// Mock advertising provider running on an ephemeral local port
pub struct MockProvider {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockProvider {
    /// Bind a listener and serve the mock provider in the background
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState {
            profiles: Mutex::new(json!([
                {"profileId": 111_222, "countryCode": "US"},
            ])),
            ..MockState::default()
        });

        let app = Router::new()
            .route("/auth/o2/token", post(token_endpoint))
            .route("/v2/profiles", get(profiles_endpoint))
            .fallback(api_endpoint)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock provider listener");
        let addr = listener.local_addr().expect("Missing local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock provider died");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Queue a response for the next authorization-code exchange
    pub fn push_exchange_reply(&self, status: u16, body: Value) {
        self.state
            .exchange_replies
            .lock()
            .unwrap()
            .push_back((status, body));
    }

    /// Queue a response for the next refresh grant
    pub fn push_refresh_reply(&self, status: u16, body: Value) {
        self.state
            .refresh_replies
            .lock()
            .unwrap()
            .push_back((status, body));
    }

    /// Queue a response for the next advertising API call
    pub fn push_api_reply(&self, status: u16, body: Value) {
        self.state
            .api_replies
            .lock()
            .unwrap()
            .push_back((status, body));
    }

    /// Replace the profile list returned by the profiles endpoint
    pub fn set_profiles(&self, profiles: Value) {
        *self.state.profiles.lock().unwrap() = profiles;
    }

    pub fn exchange_calls(&self) -> u32 {
        self.state.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> u32 {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> u32 {
        self.state.profile_calls.load(Ordering::SeqCst)
    }

    pub fn api_calls(&self) -> u32 {
        self.state.api_calls.load(Ordering::SeqCst)
    }
}

async fn token_endpoint(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let grant_type = form.get("grant_type").cloned().unwrap_or_default();

    let (status, body) = if grant_type == "refresh_token" {
        let n = state.refresh_calls.fetch_add(1, Ordering::SeqCst);
        state
            .refresh_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                (
                    200,
                    json!({
                        "access_token": format!("refreshed-access-{n}"),
                        "expires_in": 3600,
                    }),
                )
            })
    } else {
        let n = state.exchange_calls.fetch_add(1, Ordering::SeqCst);
        state
            .exchange_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                (
                    200,
                    json!({
                        "access_token": format!("initial-access-{n}"),
                        "refresh_token": format!("initial-refresh-{n}"),
                        "expires_in": 3600,
                    }),
                )
            })
    };

    (StatusCode::from_u16(status).unwrap(), Json(body))
}

async fn profiles_endpoint(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    state.profile_calls.fetch_add(1, Ordering::SeqCst);
    let profiles = state.profiles.lock().unwrap().clone();
    Json(profiles)
}

async fn api_endpoint(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    state.api_calls.fetch_add(1, Ordering::SeqCst);
    let (status, body) = state
        .api_replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| (200, json!({"ok": true})));
    (StatusCode::from_u16(status).unwrap(), Json(body))
}

/// Resources wired against the mock provider plus test identities
pub struct TestHarness {
    pub resources: Arc<ServerResources>,
    pub provider: MockProvider,
    pub advertiser_id: AdvertiserId,
}

/// Build a server configuration pointing at the mock provider
///
/// Retry delays are shrunk so backoff tests complete in milliseconds.
pub fn test_config(provider: &MockProvider) -> ServerConfig {
    ServerConfig {
        http_port: 0,
        database_url: "sqlite::memory:".to_owned(),
        encryption_key_b64: None,
        provider: ProviderConfig {
            client_id: Some("test-client-id".to_owned()),
            client_secret: Some("test-client-secret".to_owned()),
            token_url: format!("{}/auth/o2/token", provider.base_url),
            profiles_url: format!("{}/v2/profiles", provider.base_url),
            api_base_url: provider.base_url.clone(),
            profile_id_override: None,
        },
        token_skew_secs: 300,
        http_timeout_secs: 5,
        retry: RetryConfig {
            max_attempts: 3,
            base_delay_ms: 5,
            max_delay_ms: 50,
        },
    }
}

/// Spin up a mock provider and resources over an in-memory database
pub async fn setup() -> TestHarness {
    setup_with(|_| {}).await
}

/// Same as [`setup`], with a configuration tweak applied before wiring
pub async fn setup_with(tweak: impl FnOnce(&mut ServerConfig)) -> TestHarness {
    let provider = MockProvider::spawn().await;
    let mut config = test_config(&provider);
    tweak(&mut config);

    let database = Database::new("sqlite::memory:", vec![0u8; 32])
        .await
        .expect("Failed to create test database");
    let resources = ServerResources::new(config, database).expect("Failed to wire resources");

    TestHarness {
        resources,
        provider,
        advertiser_id: AdvertiserId::new(),
    }
}

/// Insert a credential row directly, returning its id
pub async fn seed_credential(
    harness: &TestHarness,
    access_token: Option<&str>,
    refresh_token: Option<&str>,
    token_expires_at: Option<DateTime<Utc>>,
) -> String {
    let credential_id = Uuid::new_v4().to_string();
    harness
        .resources
        .database
        .upsert_platform_credential(&CredentialTokens {
            id: &credential_id,
            advertiser_id: harness.advertiser_id,
            platform_id: "amazon_ads",
            profile_id: Some("111222"),
            access_token,
            refresh_token,
            token_expires_at,
        })
        .await
        .expect("Failed to seed credential");
    credential_id
}
