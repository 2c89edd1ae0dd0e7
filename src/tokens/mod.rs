// ABOUTME: Token lifecycle service: exchange, refresh, and the validated read path
// ABOUTME: Per-credential single-flight guards serialize refreshes for the same row
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use crate::audit::OperationAuditor;
use crate::constants::{platforms, timing};
use crate::database::{CredentialTokens, Database};
use crate::errors::{AppError, AppResult};
use crate::oauth2_client::{select_profile, ProviderOAuthClient};
use adbridge_core::models::{AdvertiserId, OperationType};
use adbridge_core::PlatformCredential;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// A validated access token plus the profile scope it belongs to
#[derive(Debug, Clone)]
pub struct AccessGrant {
    /// Bearer token valid for at least the skew window
    pub access_token: String,
    /// Provider sub-account the token is scoped to
    pub profile_id: Option<String>,
}

/// Result of a successful authorization-code exchange
#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    /// Identifier of the upserted credential row
    pub credential_id: String,
    /// Selected provider profile, if any
    pub profile_id: Option<String>,
}

/// Token lifecycle manager for advertising platform credentials
///
/// All token reads and writes for a credential flow through this service.
/// Refreshes for the same credential are serialized through a per-key guard;
/// concurrent callers that were waiting re-check staleness after acquiring
/// the guard and reuse the winner's token instead of spending another
/// provider-side refresh.
pub struct TokenService {
    database: Arc<Database>,
    oauth: ProviderOAuthClient,
    auditor: Arc<OperationAuditor>,
    skew: Duration,
    refresh_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl TokenService {
    /// Create a new token service
    #[must_use]
    pub fn new(
        database: Arc<Database>,
        oauth: ProviderOAuthClient,
        auditor: Arc<OperationAuditor>,
        skew: Duration,
    ) -> Self {
        Self {
            database,
            oauth,
            auditor,
            skew,
            refresh_locks: DashMap::new(),
        }
    }

    /// Load a credential by id
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` when no row exists for the id
    pub async fn get_credential(&self, credential_id: &str) -> AppResult<PlatformCredential> {
        self.database
            .get_platform_credential(credential_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Credential {credential_id}")))
    }

    /// Return a valid access token for the credential, refreshing first if
    /// the stored token is expired or inside the skew window
    ///
    /// The fresh case performs zero network calls; this is the fast path
    /// exercised on every API invocation.
    ///
    /// # Errors
    ///
    /// - `AppError::NotFound` when the credential does not exist
    /// - `AppError::MissingRefreshToken` / `AppError::TokenRefresh` when a
    ///   required refresh cannot be performed
    pub async fn get_valid_access_token(&self, credential_id: &str) -> AppResult<AccessGrant> {
        let credential = self.get_credential(credential_id).await?;

        if !credential.is_stale(Utc::now(), self.skew) {
            let access_token = credential
                .access_token
                .ok_or_else(|| AppError::internal("Fresh credential has no access token"))?;
            return Ok(AccessGrant {
                access_token,
                profile_id: credential.profile_id,
            });
        }

        let refreshed = self.refresh_if_stale(credential_id).await?;
        let access_token = refreshed
            .access_token
            .ok_or_else(|| AppError::internal("Refreshed credential has no access token"))?;

        Ok(AccessGrant {
            access_token,
            profile_id: refreshed.profile_id,
        })
    }

    /// Refresh a credential unconditionally, bypassing the staleness check
    ///
    /// Used by the API invoker when the provider rejects a token that still
    /// looked valid locally (revoked out-of-band).
    ///
    /// # Errors
    ///
    /// - `AppError::NotFound` when the credential does not exist
    /// - `AppError::MissingRefreshToken` when no refresh token is stored
    /// - `AppError::TokenRefresh` when the provider rejects the refresh
    pub async fn refresh_credential(&self, credential_id: &str) -> AppResult<PlatformCredential> {
        let lock = self.refresh_lock(credential_id);
        let _guard = lock.lock().await;

        let credential = self.get_credential(credential_id).await?;
        self.perform_refresh(credential).await
    }

    /// Refresh under the single-flight guard, skipping if a concurrent
    /// refresh already produced a fresh token
    async fn refresh_if_stale(&self, credential_id: &str) -> AppResult<PlatformCredential> {
        let lock = self.refresh_lock(credential_id);
        let _guard = lock.lock().await;

        // Re-read inside the guard: a concurrent caller may have finished
        // refreshing while this one was waiting
        let credential = self.get_credential(credential_id).await?;
        if !credential.is_stale(Utc::now(), self.skew) {
            return Ok(credential);
        }

        self.perform_refresh(credential).await
    }

    /// Call the provider token endpoint and persist the outcome
    ///
    /// On success the full `(access_token, refresh_token, token_expires_at)`
    /// tuple is written in one UPDATE. On provider rejection the stored row
    /// is left untouched so a later retry can reuse the refresh token if it
    /// is still valid provider-side.
    async fn perform_refresh(
        &self,
        credential: PlatformCredential,
    ) -> AppResult<PlatformCredential> {
        let refresh_token = credential
            .refresh_token
            .clone()
            .ok_or_else(|| AppError::MissingRefreshToken(credential.id.clone()))?;

        match self.oauth.refresh_access_token(&refresh_token).await {
            Ok(tokens) => {
                let expires_in = tokens
                    .expires_in
                    .unwrap_or(timing::DEFAULT_TOKEN_LIFETIME_SECS);
                let token_expires_at = Utc::now() + Duration::seconds(expires_in);

                self.database
                    .apply_token_refresh(
                        &credential.id,
                        credential.advertiser_id,
                        &credential.platform_id,
                        &tokens.access_token,
                        tokens.refresh_token.as_deref(),
                        token_expires_at,
                    )
                    .await?;

                info!(
                    credential_id = %credential.id,
                    expires_at = %token_expires_at,
                    rotated_refresh_token = tokens.refresh_token.is_some(),
                    "Access token refreshed"
                );
                self.auditor
                    .record_success(
                        credential.advertiser_id,
                        &credential.platform_id,
                        OperationType::RefreshToken,
                    )
                    .await;

                self.get_credential(&credential.id).await
            }
            Err(err) => {
                self.auditor
                    .record_error(
                        credential.advertiser_id,
                        &credential.platform_id,
                        OperationType::RefreshToken,
                        err.to_string(),
                    )
                    .await;
                Err(err)
            }
        }
    }

    /// Exchange an authorization code for an initial token pair and store
    /// the resulting credential
    ///
    /// The credential is upserted on `(advertiser_id, platform_id)`: a second
    /// exchange for the same advertiser replaces the stored tokens, never
    /// creating a duplicate row. Exactly one `initial_connection` log entry
    /// is written for the attempt.
    ///
    /// # Errors
    ///
    /// - `AppError::Configuration` when provider credentials are not
    ///   configured (fails before any network call, no log entry)
    /// - `AppError::ExternalAuth` when the provider rejects the code; no
    ///   credential row is written
    pub async fn exchange_authorization_code(
        &self,
        authorization_code: &str,
        advertiser_id: AdvertiserId,
        redirect_uri: &str,
    ) -> AppResult<ExchangeOutcome> {
        let platform_id = platforms::AMAZON_ADS;

        let tokens = match self
            .oauth
            .exchange_authorization_code(authorization_code, redirect_uri)
            .await
        {
            Ok(tokens) => tokens,
            Err(err @ AppError::Configuration(_)) => return Err(err),
            Err(err) => {
                self.auditor
                    .record_error(
                        advertiser_id,
                        platform_id,
                        OperationType::InitialConnection,
                        err.to_string(),
                    )
                    .await;
                return Err(err);
            }
        };

        let profile_id = self.resolve_profile_id(&tokens.access_token).await;

        let expires_in = tokens
            .expires_in
            .unwrap_or(timing::DEFAULT_TOKEN_LIFETIME_SECS);
        let token_expires_at = Utc::now() + Duration::seconds(expires_in);
        let credential_id = Uuid::new_v4().to_string();

        self.database
            .upsert_platform_credential(&CredentialTokens {
                id: &credential_id,
                advertiser_id,
                platform_id,
                profile_id: profile_id.as_deref(),
                access_token: Some(&tokens.access_token),
                refresh_token: tokens.refresh_token.as_deref(),
                token_expires_at: Some(token_expires_at),
            })
            .await?;

        info!(
            credential_id = %credential_id,
            advertiser_id = %advertiser_id,
            profile_id = profile_id.as_deref().unwrap_or("none"),
            "Platform connection established"
        );
        self.auditor
            .record_success(advertiser_id, platform_id, OperationType::InitialConnection)
            .await;

        Ok(ExchangeOutcome {
            credential_id,
            profile_id,
        })
    }

    /// Pick the profile id stored with a new credential
    ///
    /// A deployment-specific override wins when configured. Otherwise the
    /// provider's profile list is fetched with the fresh access token; an
    /// empty list (or a failed listing) leaves the profile unset with a
    /// warning, since the obtained access token is still usable.
    async fn resolve_profile_id(&self, access_token: &str) -> Option<String> {
        if let Some(fixed) = &self.oauth.config().profile_id_override {
            return Some(fixed.clone());
        }

        match self.oauth.list_profiles(access_token).await {
            Ok(profiles) => {
                let selected = select_profile(&profiles).map(|id| id.to_string());
                if selected.is_none() {
                    warn!("Provider returned no profiles; credential stored without a profile id");
                }
                selected
            }
            Err(err) => {
                warn!("Failed to list provider profiles: {err}");
                None
            }
        }
    }

    /// Get or create the single-flight guard for a credential
    fn refresh_lock(&self, credential_id: &str) -> Arc<Mutex<()>> {
        self.refresh_locks
            .entry(credential_id.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
