// ABOUTME: PlatformCredential database operations with encrypted token storage
// ABOUTME: Upserts keyed on (advertiser_id, platform_id); refresh writes the full token tuple
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use super::Database;
use crate::errors::{AppError, AppResult};
use adbridge_core::models::AdvertiserId;
use adbridge_core::PlatformCredential;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Credential token data for upsert operations
pub struct CredentialTokens<'a> {
    /// Unique credential identifier
    pub id: &'a str,
    /// Advertiser this credential belongs to
    pub advertiser_id: AdvertiserId,
    /// Advertising platform (e.g., "amazon_ads")
    pub platform_id: &'a str,
    /// Provider-assigned sub-account identifier
    pub profile_id: Option<&'a str>,
    /// Access token (plaintext; encrypted before storage)
    pub access_token: Option<&'a str>,
    /// Refresh token (plaintext; encrypted before storage)
    pub refresh_token: Option<&'a str>,
    /// Absolute access token expiry
    pub token_expires_at: Option<DateTime<Utc>>,
}

impl Database {
    /// Upsert a platform credential keyed on `(advertiser_id, platform_id)`
    ///
    /// Tokens are encrypted at rest using AES-256-GCM with AAD binding to
    /// prevent ciphertext reuse across credential rows. A repeated exchange
    /// for the same pair replaces the stored tokens in place; no duplicate
    /// row is ever created.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption or the database operation fails
    pub async fn upsert_platform_credential(&self, data: &CredentialTokens<'_>) -> AppResult<()> {
        let aad_context = credential_aad(data.advertiser_id, data.platform_id);

        let encrypted_access_token = data
            .access_token
            .map(|at| self.encrypt_data_with_aad(at, &aad_context))
            .transpose()?;
        let encrypted_refresh_token = data
            .refresh_token
            .map(|rt| self.encrypt_data_with_aad(rt, &aad_context))
            .transpose()?;

        sqlx::query(
            r"
            INSERT INTO platform_credentials (
                id, advertiser_id, platform_id, profile_id, access_token,
                refresh_token, token_expires_at, is_active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, 1, $8, $9)
            ON CONFLICT (advertiser_id, platform_id)
            DO UPDATE SET
                id = EXCLUDED.id,
                profile_id = EXCLUDED.profile_id,
                access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                token_expires_at = EXCLUDED.token_expires_at,
                is_active = 1,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(data.id)
        .bind(data.advertiser_id.to_string())
        .bind(data.platform_id)
        .bind(data.profile_id)
        .bind(encrypted_access_token.as_deref())
        .bind(encrypted_refresh_token.as_deref())
        .bind(data.token_expires_at)
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to upsert platform credential: {e}")))?;

        Ok(())
    }

    /// Get a platform credential by id
    ///
    /// Decrypts token material using AAD binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the query or decryption fails
    pub async fn get_platform_credential(
        &self,
        credential_id: &str,
    ) -> AppResult<Option<PlatformCredential>> {
        let row = sqlx::query(
            r"
            SELECT id, advertiser_id, platform_id, profile_id, access_token,
                   refresh_token, token_expires_at, is_active, created_at, updated_at
            FROM platform_credentials
            WHERE id = $1
            ",
        )
        .bind(credential_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to query platform credential: {e}")))?;

        row.map_or_else(
            || Ok(None),
            |row| Ok(Some(self.row_to_platform_credential(&row)?)),
        )
    }

    /// Get the credential for an `(advertiser, platform)` pair
    ///
    /// # Errors
    ///
    /// Returns an error if the query or decryption fails
    pub async fn get_credential_for_advertiser(
        &self,
        advertiser_id: AdvertiserId,
        platform_id: &str,
    ) -> AppResult<Option<PlatformCredential>> {
        let row = sqlx::query(
            r"
            SELECT id, advertiser_id, platform_id, profile_id, access_token,
                   refresh_token, token_expires_at, is_active, created_at, updated_at
            FROM platform_credentials
            WHERE advertiser_id = $1 AND platform_id = $2
            ",
        )
        .bind(advertiser_id.to_string())
        .bind(platform_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to query platform credential: {e}")))?;

        row.map_or_else(
            || Ok(None),
            |row| Ok(Some(self.row_to_platform_credential(&row)?)),
        )
    }

    /// Apply a successful token refresh to a credential
    ///
    /// Writes the complete token tuple in a single UPDATE so the stored row
    /// is always internally consistent: an access token is never paired with
    /// a foreign expiry. When the provider rotated the refresh token the new
    /// one replaces the old in the same statement; otherwise the stored
    /// refresh token is left as is.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption or the database operation fails
    pub async fn apply_token_refresh(
        &self,
        credential_id: &str,
        advertiser_id: AdvertiserId,
        platform_id: &str,
        access_token: &str,
        rotated_refresh_token: Option<&str>,
        token_expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let aad_context = credential_aad(advertiser_id, platform_id);
        let encrypted_access_token = self.encrypt_data_with_aad(access_token, &aad_context)?;

        if let Some(rt) = rotated_refresh_token {
            let encrypted_refresh_token = self.encrypt_data_with_aad(rt, &aad_context)?;
            sqlx::query(
                r"
                UPDATE platform_credentials
                SET access_token = $2,
                    refresh_token = $3,
                    token_expires_at = $4,
                    updated_at = $5
                WHERE id = $1
                ",
            )
            .bind(credential_id)
            .bind(&encrypted_access_token)
            .bind(&encrypted_refresh_token)
            .bind(token_expires_at)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
        } else {
            sqlx::query(
                r"
                UPDATE platform_credentials
                SET access_token = $2,
                    token_expires_at = $3,
                    updated_at = $4
                WHERE id = $1
                ",
            )
            .bind(credential_id)
            .bind(&encrypted_access_token)
            .bind(token_expires_at)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
        }
        .map_err(|e| AppError::database(format!("Failed to apply token refresh: {e}")))?;

        Ok(())
    }

    /// Activate or deactivate a credential without deleting it
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn set_credential_active(
        &self,
        credential_id: &str,
        is_active: bool,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE platform_credentials SET is_active = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(credential_id)
        .bind(is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update credential status: {e}")))?;

        Ok(())
    }

    /// Convert a database row to a `PlatformCredential`
    ///
    /// Decrypts token material using AAD binding.
    ///
    /// # Errors
    ///
    /// Returns an error if decryption fails (possibly due to tampered data or
    /// AAD mismatch)
    fn row_to_platform_credential(&self, row: &SqliteRow) -> AppResult<PlatformCredential> {
        let advertiser_id_str: String = row.get("advertiser_id");
        let advertiser_id: AdvertiserId = advertiser_id_str.parse()?;
        let platform_id: String = row.get("platform_id");

        let aad_context = credential_aad(advertiser_id, &platform_id);

        let encrypted_access_token: Option<String> = row.get("access_token");
        let access_token = encrypted_access_token
            .as_deref()
            .map(|eat| self.decrypt_data_with_aad(eat, &aad_context))
            .transpose()?;

        let encrypted_refresh_token: Option<String> = row.get("refresh_token");
        let refresh_token = encrypted_refresh_token
            .as_deref()
            .map(|ert| self.decrypt_data_with_aad(ert, &aad_context))
            .transpose()?;

        Ok(PlatformCredential {
            id: row.get("id"),
            advertiser_id,
            platform_id,
            profile_id: row.get("profile_id"),
            access_token,
            refresh_token,
            token_expires_at: row.get("token_expires_at"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

/// AAD context binding ciphertext to one credential row
fn credential_aad(advertiser_id: AdvertiserId, platform_id: &str) -> String {
    format!("{advertiser_id}|{platform_id}|platform_credentials")
}
