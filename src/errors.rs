// ABOUTME: Unified error handling with a typed taxonomy and HTTP response mapping
// ABOUTME: Callers pattern-match on error kind, never on message text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Result alias used throughout the crate
pub type AppResult<T> = Result<T, AppError>;

/// Unified application error
///
/// The provider-facing variants mirror the failure classes of the token
/// lifecycle: configuration problems are fatal and surface before any network
/// call, authorization failures require the user to reconnect, and transient
/// provider failures are the only class the invoker retries automatically.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid client configuration; fatal, never retried
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider rejected the authorization code; the OAuth flow must restart
    #[error("Provider rejected authorization code: {0}")]
    ExternalAuth(String),

    /// Credential exists but has no refresh token; re-authorization required
    #[error("Credential {0} has no refresh token")]
    MissingRefreshToken(String),

    /// Provider rejected a refresh attempt; payload preserved opaquely
    #[error("Provider rejected token refresh: {payload}")]
    TokenRefresh {
        /// Serialized provider error body
        payload: String,
    },

    /// Provider returned 401 even after one forced refresh
    #[error("Provider API call unauthorized after forced token refresh")]
    Authorization,

    /// Provider rate limit hit; retried as transient until attempts run out
    #[error("Provider rate limit exceeded")]
    RateLimitExceeded,

    /// Provider returned a failure status
    #[error("Provider error (HTTP {status}): {body}")]
    Provider {
        /// HTTP status code returned by the provider; 0 marks a network error
        status: u16,
        /// Raw response body or transport error description
        body: String,
    },

    /// The configured attempt budget was spent on transient failures
    #[error("Retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last transient error observed
        #[source]
        source: Box<AppError>,
    },

    /// Requested resource does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Caller-supplied input failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Authorization-code rejection
    pub fn external_auth(msg: impl Into<String>) -> Self {
        Self::ExternalAuth(msg.into())
    }

    /// Refresh rejection carrying the provider payload
    pub fn token_refresh(payload: impl Into<String>) -> Self {
        Self::TokenRefresh {
            payload: payload.into(),
        }
    }

    /// Provider failure with status and body
    pub fn provider(status: u16, body: impl Into<String>) -> Self {
        Self::Provider {
            status,
            body: body.into(),
        }
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Database failure
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Input validation failure
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Internal failure
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error is transient and safe to retry with backoff
    ///
    /// Only network-level failures, provider 5xx responses, and rate limiting
    /// qualify. Authorization and configuration failures never do.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::RateLimitExceeded => true,
            Self::Provider { status, .. } => *status >= 500 || *status == 0,
            _ => false,
        }
    }

    /// Whether the error means the advertiser must reconnect their account
    #[must_use]
    pub const fn needs_reauthorization(&self) -> bool {
        matches!(
            self,
            Self::ExternalAuth(_)
                | Self::MissingRefreshToken(_)
                | Self::TokenRefresh { .. }
                | Self::Authorization
        )
    }

    /// Stable machine-readable code for API responses
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::ExternalAuth(_) => "external_auth_error",
            Self::MissingRefreshToken(_) => "missing_refresh_token",
            Self::TokenRefresh { .. } => "token_refresh_error",
            Self::Authorization => "authorization_error",
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::Provider { .. } => "provider_error",
            Self::RetriesExhausted { .. } => "retries_exhausted",
            Self::NotFound(_) => "not_found",
            Self::Database(_) => "database_error",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal_error",
        }
    }

    /// HTTP status the error maps to at the REST boundary
    ///
    /// Re-authorization classes map to 401 so the UI can show "reconnect your
    /// account"; transient classes map to 502/429 so it can show "try again".
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::Configuration(_) | Self::Internal(_) | Self::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::ExternalAuth(_)
            | Self::MissingRefreshToken(_)
            | Self::TokenRefresh { .. }
            | Self::Authorization => StatusCode::UNAUTHORIZED,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::Provider { .. } | Self::RetriesExhausted { .. } => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        Self::invalid_input(format!("Invalid UUID: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON serialization failed: {err}"))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::database(format!("Database operation failed: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "needs_reauthorization": self.needs_reauthorization(),
            }
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(AppError::RateLimitExceeded.is_transient());
        assert!(AppError::provider(503, "unavailable").is_transient());
        assert!(AppError::provider(0, "connect error").is_transient());
        assert!(!AppError::provider(404, "missing").is_transient());
        assert!(!AppError::Authorization.is_transient());
        assert!(!AppError::configuration("no client id").is_transient());
    }

    #[test]
    fn reauthorization_classes_map_to_unauthorized() {
        for err in [
            AppError::external_auth("invalid_grant"),
            AppError::MissingRefreshToken("cred-1".to_owned()),
            AppError::token_refresh("{\"error\":\"invalid_grant\"}"),
            AppError::Authorization,
        ] {
            assert!(err.needs_reauthorization());
            assert_eq!(err.http_status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn retries_exhausted_preserves_source() {
        let err = AppError::RetriesExhausted {
            attempts: 3,
            source: Box::new(AppError::provider(500, "boom")),
        };
        assert_eq!(err.code(), "retries_exhausted");
        assert!(err.to_string().contains("HTTP 500"));
    }
}
