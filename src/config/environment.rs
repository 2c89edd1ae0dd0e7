// ABOUTME: Environment-only configuration with typed parsing and explicit defaults
// ABOUTME: Loads server, database, provider, and retry settings from ADBRIDGE_* variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use crate::constants::{amazon, retries, timing};
use crate::errors::{AppError, AppResult};
use chrono::Duration;
use std::env;

/// Amazon Ads provider configuration
///
/// Client credentials are optional at load time: a deployment that only reads
/// stored data never needs them, and the token exchange path validates their
/// presence before any network call.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// OAuth client id issued by the provider
    pub client_id: Option<String>,
    /// OAuth client secret issued by the provider
    pub client_secret: Option<String>,
    /// Token endpoint URL
    pub token_url: String,
    /// Profiles listing endpoint URL
    pub profiles_url: String,
    /// Advertising API base URL
    pub api_base_url: String,
    /// Deployment-specific profile override; when set it takes precedence
    /// over the profile selected from the provider's profile list
    pub profile_id_override: Option<String>,
}

impl ProviderConfig {
    /// Resolve the client id, failing if it is not configured
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` when the client id is absent
    pub fn require_client_id(&self) -> AppResult<&str> {
        self.client_id
            .as_deref()
            .ok_or_else(|| AppError::configuration("ADBRIDGE_AMAZON_CLIENT_ID is not set"))
    }

    /// Resolve the client secret, failing if it is not configured
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` when the client secret is absent
    pub fn require_client_secret(&self) -> AppResult<&str> {
        self.client_secret
            .as_deref()
            .ok_or_else(|| AppError::configuration("ADBRIDGE_AMAZON_CLIENT_SECRET is not set"))
    }
}

/// Retry tuning for transient provider failures
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum attempts per invocation, first try included
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,
    /// Ceiling on a single backoff delay in milliseconds
    pub max_delay_ms: u64,
}

/// Server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Database URL (SQLite)
    pub database_url: String,
    /// Base64-encoded 32-byte key for token encryption at rest
    pub encryption_key_b64: Option<String>,
    /// Provider endpoints and credentials
    pub provider: ProviderConfig,
    /// Staleness skew window in seconds
    pub token_skew_secs: i64,
    /// Outbound HTTP timeout in seconds
    pub http_timeout_secs: u64,
    /// Retry tuning
    pub retry: RetryConfig,
}

impl ServerConfig {
    /// Load configuration from `ADBRIDGE_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` when a set variable fails to parse
    /// (ports, timeouts, retry counts). Unset variables fall back to
    /// defaults; provider credentials stay `None` until required.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            http_port: parse_var("ADBRIDGE_HTTP_PORT", 8081_u16)?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./data/adbridge.db".to_owned()),
            encryption_key_b64: env::var("ADBRIDGE_ENCRYPTION_KEY").ok(),
            provider: ProviderConfig {
                client_id: env::var("ADBRIDGE_AMAZON_CLIENT_ID").ok(),
                client_secret: env::var("ADBRIDGE_AMAZON_CLIENT_SECRET").ok(),
                token_url: env::var("ADBRIDGE_AMAZON_TOKEN_URL")
                    .unwrap_or_else(|_| amazon::TOKEN_URL.to_owned()),
                profiles_url: env::var("ADBRIDGE_AMAZON_PROFILES_URL")
                    .unwrap_or_else(|_| amazon::PROFILES_URL.to_owned()),
                api_base_url: env::var("ADBRIDGE_AMAZON_API_BASE_URL")
                    .unwrap_or_else(|_| amazon::API_BASE_URL.to_owned()),
                profile_id_override: env::var("ADBRIDGE_AMAZON_PROFILE_ID").ok(),
            },
            token_skew_secs: parse_var("ADBRIDGE_TOKEN_SKEW_SECS", timing::TOKEN_SKEW_WINDOW_SECS)?,
            http_timeout_secs: parse_var("ADBRIDGE_HTTP_TIMEOUT_SECS", timing::HTTP_TIMEOUT_SECS)?,
            retry: RetryConfig {
                max_attempts: parse_var(
                    "ADBRIDGE_RETRY_MAX_ATTEMPTS",
                    retries::DEFAULT_MAX_ATTEMPTS,
                )?,
                base_delay_ms: parse_var(
                    "ADBRIDGE_RETRY_BASE_DELAY_MS",
                    retries::DEFAULT_BASE_DELAY_MS,
                )?,
                max_delay_ms: parse_var(
                    "ADBRIDGE_RETRY_MAX_DELAY_MS",
                    retries::DEFAULT_MAX_DELAY_MS,
                )?,
            },
        })
    }

    /// Skew window as a chrono duration
    #[must_use]
    pub fn token_skew(&self) -> Duration {
        Duration::seconds(self.token_skew_secs)
    }
}

/// Parse an environment variable, falling back to a default when unset
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::configuration(format!("Invalid value for {name}: {raw}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_client_credentials_fail_only_at_use_time() {
        let provider = ProviderConfig {
            client_id: None,
            client_secret: None,
            token_url: amazon::TOKEN_URL.to_owned(),
            profiles_url: amazon::PROFILES_URL.to_owned(),
            api_base_url: amazon::API_BASE_URL.to_owned(),
            profile_id_override: None,
        };

        assert!(matches!(
            provider.require_client_id(),
            Err(AppError::Configuration(_))
        ));
        assert!(matches!(
            provider.require_client_secret(),
            Err(AppError::Configuration(_))
        ));
    }
}
