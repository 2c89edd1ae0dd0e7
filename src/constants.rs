// ABOUTME: Application constants and default configuration values
// ABOUTME: Platform identifiers, timing defaults, and provider endpoint defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

/// Advertising platform identifiers
pub mod platforms {
    /// Amazon Ads platform identifier
    pub const AMAZON_ADS: &str = "amazon_ads";
}

/// Timing defaults for the token lifecycle
pub mod timing {
    /// Safety margin subtracted from the literal expiry when deciding staleness
    pub const TOKEN_SKEW_WINDOW_SECS: i64 = 300;

    /// Access token lifetime assumed when the provider omits `expires_in`
    pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

    /// Outbound HTTP timeout applied to every provider call
    pub const HTTP_TIMEOUT_SECS: u64 = 30;
}

/// Retry defaults for transient provider failures
pub mod retries {
    /// Maximum attempts per invocation, first try included
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Base backoff delay in milliseconds
    pub const DEFAULT_BASE_DELAY_MS: u64 = 500;

    /// Ceiling on a single backoff delay in milliseconds
    pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
}

/// Default Amazon Ads endpoints (overridable through configuration)
pub mod amazon {
    /// OAuth token endpoint (Login with Amazon)
    pub const TOKEN_URL: &str = "https://api.amazon.com/auth/o2/token";

    /// Advertising profiles listing endpoint
    pub const PROFILES_URL: &str = "https://advertising-api.amazon.com/v2/profiles";

    /// Advertising API base URL
    pub const API_BASE_URL: &str = "https://advertising-api.amazon.com";
}

/// HTTP header names specific to the advertising provider
pub mod headers {
    /// Client id header required on every advertising API call
    pub const CLIENT_ID: &str = "Amazon-Advertising-API-ClientId";

    /// Profile scope header selecting the provider sub-account
    pub const SCOPE: &str = "Amazon-Advertising-API-Scope";
}
