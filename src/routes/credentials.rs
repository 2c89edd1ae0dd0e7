// ABOUTME: HTTP endpoints for credential reads, provider invocation, and status
// ABOUTME: Used by the backend glue (chat functions) rather than the browser directly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use crate::context::ServerResources;
use crate::errors::{AppError, AppResult};
use crate::providers::{ApiOperation, ApiRequest, ApiResponse};
use adbridge_core::models::OperationLogEntry;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Response carrying a validated access token
#[derive(Debug, Serialize)]
pub struct TokenGrantResponse {
    /// Bearer token valid for at least the skew window
    pub access_token: String,
    /// Provider sub-account the token is scoped to
    pub profile_id: Option<String>,
}

/// Request to invoke a provider API operation
#[derive(Debug, Deserialize)]
pub struct InvokeRequest {
    /// Logical operation name (e.g., "`list_campaigns`")
    pub operation: String,
    /// HTTP method for the provider call
    pub method: String,
    /// Path appended to the provider API base URL
    pub path: String,
    /// Optional JSON body
    pub body: Option<Value>,
}

/// Connection status summary for a credential
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Credential identifier
    pub credential_id: String,
    /// "connected", "`token_expired`", or "disconnected"
    pub status: String,
    /// Selected provider profile, if any
    pub profile_id: Option<String>,
    /// Access token expiry, when known
    pub token_expires_at: Option<DateTime<Utc>>,
}

/// Query parameters for the operation log listing
#[derive(Debug, Deserialize)]
pub struct OperationLogQuery {
    /// Maximum entries to return (default 50)
    pub limit: Option<i64>,
}

/// Credential routes handler
#[derive(Clone)]
pub struct CredentialRoutes;

impl CredentialRoutes {
    /// Build the credentials router
    pub fn router(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/credentials/:id/token", get(token))
            .route("/api/credentials/:id/invoke", post(invoke))
            .route("/api/credentials/:id/status", get(status))
            .route("/api/credentials/:id/operations", get(operations))
            .with_state(resources)
    }
}

async fn token(
    State(resources): State<Arc<ServerResources>>,
    Path(credential_id): Path<String>,
) -> AppResult<Json<TokenGrantResponse>> {
    let grant = resources
        .token_service
        .get_valid_access_token(&credential_id)
        .await?;

    Ok(Json(TokenGrantResponse {
        access_token: grant.access_token,
        profile_id: grant.profile_id,
    }))
}

async fn invoke(
    State(resources): State<Arc<ServerResources>>,
    Path(credential_id): Path<String>,
    Json(request): Json<InvokeRequest>,
) -> AppResult<Json<ApiResponse>> {
    let operation: ApiOperation = request.operation.parse()?;
    let method = Method::from_bytes(request.method.to_uppercase().as_bytes())
        .map_err(|_| AppError::invalid_input(format!("Invalid HTTP method: {}", request.method)))?;

    let mut api_request = ApiRequest::new(method, request.path);
    if let Some(body) = request.body {
        api_request = api_request.with_body(body);
    }

    let response = resources
        .invoker
        .invoke(&credential_id, operation, api_request)
        .await?;

    Ok(Json(response))
}

async fn status(
    State(resources): State<Arc<ServerResources>>,
    Path(credential_id): Path<String>,
) -> AppResult<Json<StatusResponse>> {
    let credential = resources.token_service.get_credential(&credential_id).await?;

    let status = if !credential.is_active || credential.refresh_token.is_none() {
        "disconnected"
    } else if credential.is_stale(Utc::now(), resources.config.token_skew()) {
        "token_expired"
    } else {
        "connected"
    };

    Ok(Json(StatusResponse {
        credential_id: credential.id,
        status: status.to_owned(),
        profile_id: credential.profile_id,
        token_expires_at: credential.token_expires_at,
    }))
}

async fn operations(
    State(resources): State<Arc<ServerResources>>,
    Path(credential_id): Path<String>,
    Query(query): Query<OperationLogQuery>,
) -> AppResult<Json<Vec<OperationLogEntry>>> {
    let credential = resources.token_service.get_credential(&credential_id).await?;
    let limit = query.limit.unwrap_or(50).clamp(1, 500);

    let entries = resources
        .database
        .list_operation_log(credential.advertiser_id, limit)
        .await?;

    Ok(Json(entries))
}
