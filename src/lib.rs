// ABOUTME: Main library entry point for the Adbridge campaign management core
// ABOUTME: Credential token lifecycle and resilient provider API invocation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

#![deny(unsafe_code)]

//! # Adbridge
//!
//! Backend core for a chat-driven advertising-campaign management
//! application. Adbridge owns the credential lifecycle for the third-party
//! advertising platform and the resilient invocation layer through which
//! every campaign operation flows.
//!
//! ## Features
//!
//! - **Token lifecycle**: authorization-code exchange, expiry tracking with a
//!   skew window, and refresh with per-credential single-flight guards
//! - **Resilient invocation**: one forced refresh on `401`, exponential
//!   backoff with jitter for transient provider failures
//! - **Encrypted storage**: provider tokens encrypted at rest with AAD
//!   binding to their credential row
//! - **Operation log**: append-only audit trail of every connection,
//!   refresh, and API operation
//!
//! ## Architecture
//!
//! - **Tokens**: lifecycle service over the credential store
//! - **Providers**: logical operations and the resilient API invoker
//! - **Database**: SQLite storage with embedded migrations
//! - **Routes**: thin REST surface for the UI/backend glue
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use adbridge::config::ServerConfig;
//! use adbridge::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     // Load configuration from ADBRIDGE_* environment variables
//!     let config = ServerConfig::from_env()?;
//!
//!     println!("Adbridge configured with port: HTTP={}", config.http_port);
//!
//!     Ok(())
//! }
//! ```

/// Operation auditing side channel
pub mod audit;

/// Configuration management
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Focused dependency injection contexts
pub mod context;

/// Credential and operation log storage
pub mod database;

/// Unified error handling with typed error kinds and HTTP responses
pub mod errors;

/// Production logging setup
pub mod logging;

/// OAuth 2.0 client against the advertising provider
pub mod oauth2_client;

/// Advertising provider operations and the resilient invoker
pub mod providers;

/// Explicit retry policy with exponential backoff and jitter
pub mod retry;

/// `HTTP` routes exposed to the UI/backend glue
pub mod routes;

/// Token lifecycle management
pub mod tokens;
