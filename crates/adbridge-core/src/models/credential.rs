// ABOUTME: PlatformCredential record for per-advertiser advertising platform connections
// ABOUTME: Holds decrypted token material, expiry, and activation state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use super::AdvertiserId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A stored connection between an advertiser and an advertising platform
///
/// At most one credential exists per `(advertiser_id, platform_id)` pair; the
/// store enforces this with a unique constraint and upsert writes. Token
/// fields are encrypted at rest and decrypted on read, so instances of this
/// struct always carry plaintext token material and must not be logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformCredential {
    /// Unique credential identifier
    pub id: String,
    /// Advertiser this credential belongs to
    pub advertiser_id: AdvertiserId,
    /// Advertising platform (e.g., "amazon_ads")
    pub platform_id: String,
    /// Provider-assigned sub-account identifier used as the API scope
    pub profile_id: Option<String>,
    /// Short-lived bearer token; `None` until the first exchange completes
    pub access_token: Option<String>,
    /// Long-lived token used to mint new access tokens
    pub refresh_token: Option<String>,
    /// Absolute access token expiry; `None` marks the token stale
    pub token_expires_at: Option<DateTime<Utc>>,
    /// Whether the connection is active (deactivation is distinct from deletion)
    pub is_active: bool,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl PlatformCredential {
    /// Whether the stored access token is stale for the given skew window
    ///
    /// A token is stale when it is absent, has no recorded expiry, or expires
    /// within `skew` of `now`. The skew window absorbs clock drift and
    /// in-flight request latency so a token is never handed out moments
    /// before the provider would reject it.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        if self.access_token.is_none() {
            return true;
        }
        match self.token_expires_at {
            Some(expires_at) => expires_at - now < skew,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(expires_at: Option<DateTime<Utc>>) -> PlatformCredential {
        let now = Utc::now();
        PlatformCredential {
            id: "cred-1".to_owned(),
            advertiser_id: AdvertiserId::new(),
            platform_id: "amazon_ads".to_owned(),
            profile_id: Some("123456".to_owned()),
            access_token: Some("at".to_owned()),
            refresh_token: Some("rt".to_owned()),
            token_expires_at: expires_at,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn fresh_token_is_not_stale() {
        let cred = credential(Some(Utc::now() + Duration::seconds(3600)));
        assert!(!cred.is_stale(Utc::now(), Duration::seconds(300)));
    }

    #[test]
    fn token_inside_skew_window_is_stale() {
        let cred = credential(Some(Utc::now() + Duration::seconds(120)));
        assert!(cred.is_stale(Utc::now(), Duration::seconds(300)));
    }

    #[test]
    fn missing_expiry_is_stale() {
        let cred = credential(None);
        assert!(cred.is_stale(Utc::now(), Duration::seconds(300)));
    }

    #[test]
    fn missing_access_token_is_stale() {
        let mut cred = credential(Some(Utc::now() + Duration::seconds(3600)));
        cred.access_token = None;
        assert!(cred.is_stale(Utc::now(), Duration::seconds(300)));
    }
}
