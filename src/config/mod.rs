// ABOUTME: Configuration module organization for Adbridge
// ABOUTME: Environment-based server and provider configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

/// Environment-based configuration loading
pub mod environment;

pub use environment::{ProviderConfig, RetryConfig, ServerConfig};
