// ABOUTME: Route module organization for Adbridge HTTP endpoints
// ABOUTME: Thin handlers delegating to the token service and API invoker
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

/// Connection establishment routes (authorization-code exchange)
pub mod connections;
/// Credential read, invoke, and status routes
pub mod credentials;
/// Health check routes
pub mod health;

pub use connections::{ConnectionRoutes, ExchangeRequest, ExchangeResponse};
pub use credentials::{CredentialRoutes, InvokeRequest, StatusResponse, TokenGrantResponse};

use crate::context::ServerResources;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Assemble the full application router
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(health::router())
        .merge(ConnectionRoutes::router(Arc::clone(&resources)))
        .merge(CredentialRoutes::router(resources))
        .layer(TraceLayer::new_for_http())
}
