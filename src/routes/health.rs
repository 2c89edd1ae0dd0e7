// ABOUTME: Health check endpoint for liveness probes
// ABOUTME: Reports service name and version without touching the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

/// Health check router
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
