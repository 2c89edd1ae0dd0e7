// ABOUTME: OAuth 2.0 client for the advertising provider's token and profile endpoints
// ABOUTME: Authorization-code exchange, refresh grants, and profile listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use crate::config::ProviderConfig;
use crate::constants::headers;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Successful token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Short-lived bearer token
    pub access_token: String,
    /// Long-lived refresh token; refresh responses may omit it when the
    /// provider does not rotate
    pub refresh_token: Option<String>,
    /// Access token lifetime in seconds
    pub expires_in: Option<i64>,
}

/// One provider sub-account profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Provider-assigned profile identifier
    #[serde(rename = "profileId")]
    pub profile_id: i64,
    /// Marketplace country code
    #[serde(rename = "countryCode", skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Currency used by the profile
    #[serde(rename = "currencyCode", skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
}

/// OAuth client against the advertising provider
///
/// Holds the shared HTTP client handle (constructed once at startup and
/// injected) and the provider endpoint configuration.
#[derive(Clone)]
pub struct ProviderOAuthClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl ProviderOAuthClient {
    /// Create a new provider OAuth client
    #[must_use]
    pub const fn new(http: reqwest::Client, config: ProviderConfig) -> Self {
        Self { http, config }
    }

    /// Provider configuration in use
    #[must_use]
    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Exchange an authorization code for an initial token pair
    ///
    /// Client configuration is validated before any network call.
    ///
    /// # Errors
    ///
    /// - `AppError::Configuration` when client id/secret are not set
    /// - `AppError::ExternalAuth` when the provider rejects the code
    ///   (expired or reused); the provider's error body is preserved
    /// - `AppError::Provider` with status 0 on transport failure
    pub async fn exchange_authorization_code(
        &self,
        authorization_code: &str,
        redirect_uri: &str,
    ) -> AppResult<TokenResponse> {
        let client_id = self.config.require_client_id()?;
        let client_secret = self.config.require_client_secret()?;

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", authorization_code),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| AppError::provider(0, format!("Token endpoint unreachable: {e}")))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::external_auth(body));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::provider(0, format!("Malformed token response: {e}")))
    }

    /// Mint a new access token from a refresh token
    ///
    /// # Errors
    ///
    /// - `AppError::Configuration` when client id/secret are not set
    /// - `AppError::TokenRefresh` when the provider rejects the refresh
    ///   token (e.g. revoked); the provider's error payload is carried
    ///   opaquely for the operation log
    /// - `AppError::Provider` with status 0 on transport failure
    pub async fn refresh_access_token(&self, refresh_token: &str) -> AppResult<TokenResponse> {
        let client_id = self.config.require_client_id()?;
        let client_secret = self.config.require_client_secret()?;

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await
            .map_err(|e| AppError::provider(0, format!("Token endpoint unreachable: {e}")))?;

        if !response.status().is_success() {
            let payload = response.text().await.unwrap_or_default();
            return Err(AppError::token_refresh(payload));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::provider(0, format!("Malformed token response: {e}")))
    }

    /// List the provider sub-account profiles visible to an access token
    ///
    /// # Errors
    ///
    /// - `AppError::Configuration` when the client id is not set
    /// - `AppError::Provider` on a failure status or transport error
    pub async fn list_profiles(&self, access_token: &str) -> AppResult<Vec<ProfileSummary>> {
        let client_id = self.config.require_client_id()?;

        let response = self
            .http
            .get(&self.config.profiles_url)
            .bearer_auth(access_token)
            .header(headers::CLIENT_ID, client_id)
            .send()
            .await
            .map_err(|e| AppError::provider(0, format!("Profiles endpoint unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::provider(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::provider(0, format!("Malformed profiles response: {e}")))
    }
}

/// Select the profile used as the API scope from a provider profile list
///
/// The provider does not document a stable ordering, so the numerically
/// lowest profile id is chosen as the deterministic tie-break.
#[must_use]
pub fn select_profile(profiles: &[ProfileSummary]) -> Option<i64> {
    profiles.iter().map(|p| p.profile_id).min()
}
