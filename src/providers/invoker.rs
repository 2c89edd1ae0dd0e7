// ABOUTME: Resilient provider API invoker with forced-refresh-on-401 and backoff retries
// ABOUTME: Every invocation writes exactly one operation log entry after its terminal outcome
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use super::ApiOperation;
use crate::audit::OperationAuditor;
use crate::config::ProviderConfig;
use crate::constants::headers;
use crate::errors::{AppError, AppResult};
use crate::retry::{retry_with_policy, RetryPolicy};
use crate::tokens::{AccessGrant, TokenService};
use adbridge_core::models::OperationType;
use http::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// One outbound provider API request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path appended to the configured API base URL (must start with `/`)
    pub path: String,
    /// Optional JSON body
    pub body: Option<Value>,
    /// Additional headers beyond the standard provider set
    pub extra_headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// Request with no body or extra headers
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            extra_headers: Vec::new(),
        }
    }

    /// Attach a JSON body
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach an extra header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }
}

/// Raw provider response returned to the caller on success
#[derive(Debug, Clone, serde::Serialize)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, parsed as JSON when possible
    pub body: Value,
}

/// Resilient invoker for the advertising API
///
/// Wraps every outbound call with a validated access token, retries exactly
/// once on `401` after a forced refresh, and applies the injected retry
/// policy to transient failures. Authorization failures and non-transient
/// provider errors propagate on first occurrence.
pub struct ApiInvoker {
    http: reqwest::Client,
    tokens: Arc<TokenService>,
    auditor: Arc<OperationAuditor>,
    config: ProviderConfig,
    policy: RetryPolicy,
}

impl ApiInvoker {
    /// Create a new API invoker
    #[must_use]
    pub const fn new(
        http: reqwest::Client,
        tokens: Arc<TokenService>,
        auditor: Arc<OperationAuditor>,
        config: ProviderConfig,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            http,
            tokens,
            auditor,
            config,
            policy,
        }
    }

    /// Invoke a provider API operation on behalf of a credential
    ///
    /// Exactly one operation log entry is written per invocation, after the
    /// terminal outcome is known (retries do not multiply entries).
    ///
    /// # Errors
    ///
    /// - `AppError::Authorization` when the provider rejects the token even
    ///   after one forced refresh
    /// - `AppError::RetriesExhausted` when transient failures outlast the
    ///   attempt budget
    /// - `AppError::Provider` for non-transient provider failures
    /// - token lifecycle errors propagated from the accessor
    pub async fn invoke(
        &self,
        credential_id: &str,
        operation: ApiOperation,
        request: ApiRequest,
    ) -> AppResult<ApiResponse> {
        let credential = self.tokens.get_credential(credential_id).await?;
        let operation_name = operation.to_string();

        let result = retry_with_policy(self.policy, &operation_name, || {
            self.attempt(credential_id, &request)
        })
        .await;

        match &result {
            Ok(_) => {
                self.auditor
                    .record_success(
                        credential.advertiser_id,
                        &credential.platform_id,
                        OperationType::Api(operation_name.clone()),
                    )
                    .await;
            }
            Err(err) => {
                self.auditor
                    .record_error(
                        credential.advertiser_id,
                        &credential.platform_id,
                        OperationType::Api(operation_name.clone()),
                        err.to_string(),
                    )
                    .await;
            }
        }

        result
    }

    /// One attempt: token fetch, request, and the single forced-refresh
    /// retry on 401
    ///
    /// The 401 handling lives inside the attempt so that `Authorization`
    /// (non-transient) terminates the surrounding retry loop.
    async fn attempt(&self, credential_id: &str, request: &ApiRequest) -> AppResult<ApiResponse> {
        let grant = self.tokens.get_valid_access_token(credential_id).await?;
        let (status, body) = self.send(request, &grant).await?;

        if status == 401 {
            // The token was invalidated out-of-band between the staleness
            // check and provider receipt; force one refresh and retry once
            warn!(
                credential_id,
                "Provider returned 401; forcing a token refresh and retrying once"
            );
            self.tokens.refresh_credential(credential_id).await?;
            let grant = self.tokens.get_valid_access_token(credential_id).await?;
            let (status, body) = self.send(request, &grant).await?;

            if status == 401 {
                return Err(AppError::Authorization);
            }
            return classify(status, body);
        }

        classify(status, body)
    }

    /// Send the request with the provider header set applied
    async fn send(&self, request: &ApiRequest, grant: &AccessGrant) -> AppResult<(u16, Value)> {
        let client_id = self.config.require_client_id()?;
        let url = format!("{}{}", self.config.api_base_url, request.path);

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .bearer_auth(&grant.access_token)
            .header(headers::CLIENT_ID, client_id);

        if let Some(profile_id) = &grant.profile_id {
            builder = builder.header(headers::SCOPE, profile_id);
        }
        for (name, value) in &request.extra_headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::provider(0, format!("Provider unreachable: {e}")))?;

        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        Ok((status, body))
    }
}

/// Map a provider response into the success value or a typed error
///
/// `429` and `5xx` are transient (retried by the policy); other failure
/// statuses propagate immediately.
fn classify(status: u16, body: Value) -> AppResult<ApiResponse> {
    match status {
        200..=299 => Ok(ApiResponse { status, body }),
        429 => Err(AppError::RateLimitExceeded),
        _ => Err(AppError::provider(status, body.to_string())),
    }
}
