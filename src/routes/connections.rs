// ABOUTME: HTTP endpoints for establishing platform connections
// ABOUTME: Receives the OAuth authorization code and delegates to the token service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use crate::context::ServerResources;
use crate::errors::{AppError, AppResult};
use adbridge_core::models::AdvertiserId;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request to exchange an authorization code for a stored credential
#[derive(Debug, Deserialize)]
pub struct ExchangeRequest {
    /// Authorization code delivered by the OAuth redirect
    pub code: String,
    /// Advertiser establishing the connection
    pub advertiser_id: AdvertiserId,
    /// Redirect URI used in the authorization request
    pub redirect_uri: String,
}

/// Response for a successful exchange
#[derive(Debug, Serialize)]
pub struct ExchangeResponse {
    /// Identifier of the stored credential
    pub credential_id: String,
    /// Selected provider profile, if any
    pub profile_id: Option<String>,
}

/// Connection establishment routes handler
#[derive(Clone)]
pub struct ConnectionRoutes;

impl ConnectionRoutes {
    /// Build the connections router
    pub fn router(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/connections/exchange", post(exchange))
            .with_state(resources)
    }
}

async fn exchange(
    State(resources): State<Arc<ServerResources>>,
    Json(request): Json<ExchangeRequest>,
) -> AppResult<Json<ExchangeResponse>> {
    if request.code.is_empty() {
        return Err(AppError::invalid_input("Authorization code cannot be empty"));
    }

    let outcome = resources
        .token_service
        .exchange_authorization_code(&request.code, request.advertiser_id, &request.redirect_uri)
        .await?;

    Ok(Json(ExchangeResponse {
        credential_id: outcome.credential_id,
        profile_id: outcome.profile_id,
    }))
}
