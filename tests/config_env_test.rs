// ABOUTME: Tests for environment-based configuration loading
// ABOUTME: Serialized because environment variables are process-global
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use adbridge::config::ServerConfig;
use adbridge::errors::AppError;
use serial_test::serial;
use std::env;

fn clear_adbridge_env() {
    for (key, _) in env::vars() {
        if key.starts_with("ADBRIDGE_") {
            env::remove_var(&key);
        }
    }
    env::remove_var("DATABASE_URL");
}

#[test]
#[serial]
fn defaults_apply_when_nothing_is_set() {
    clear_adbridge_env();

    let config = ServerConfig::from_env().expect("Failed to load config");

    assert_eq!(config.http_port, 8081);
    assert_eq!(config.token_skew_secs, 300);
    assert_eq!(config.http_timeout_secs, 30);
    assert_eq!(config.retry.max_attempts, 3);
    assert!(config.provider.client_id.is_none());
    assert!(config.provider.profile_id_override.is_none());
}

#[test]
#[serial]
fn set_variables_override_defaults() {
    clear_adbridge_env();
    env::set_var("ADBRIDGE_HTTP_PORT", "9090");
    env::set_var("ADBRIDGE_AMAZON_CLIENT_ID", "client-abc");
    env::set_var("ADBRIDGE_AMAZON_PROFILE_ID", "555666");
    env::set_var("ADBRIDGE_RETRY_MAX_ATTEMPTS", "5");
    env::set_var("DATABASE_URL", "sqlite:./test.db");

    let config = ServerConfig::from_env().expect("Failed to load config");

    assert_eq!(config.http_port, 9090);
    assert_eq!(config.provider.client_id.as_deref(), Some("client-abc"));
    assert_eq!(
        config.provider.profile_id_override.as_deref(),
        Some("555666")
    );
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.database_url, "sqlite:./test.db");

    clear_adbridge_env();
}

#[test]
#[serial]
fn invalid_values_surface_as_configuration_errors() {
    clear_adbridge_env();
    env::set_var("ADBRIDGE_HTTP_PORT", "not-a-port");

    let err = ServerConfig::from_env().expect_err("Expected parse failure");
    assert!(matches!(err, AppError::Configuration(_)));

    clear_adbridge_env();
}
