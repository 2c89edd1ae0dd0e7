// ABOUTME: Operation log event types for connection and API call auditing
// ABOUTME: OperationType, OperationStatus, and OperationLogEntry DTOs with builder pattern
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use super::AdvertiserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

/// Kind of operation recorded in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// First authorization: code exchanged for an initial token pair
    InitialConnection,
    /// Access token refreshed from a stored refresh token
    RefreshToken,
    /// Provider API call, named by the caller (e.g., "`list_campaigns`")
    Api(String),
}

impl Display for OperationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::InitialConnection => write!(f, "initial_connection"),
            Self::RefreshToken => write!(f, "refresh_token"),
            Self::Api(name) => write!(f, "{name}"),
        }
    }
}

impl OperationType {
    /// Parse the stored string form back into an operation type
    #[must_use]
    pub fn from_str_value(value: &str) -> Self {
        match value {
            "initial_connection" => Self::InitialConnection,
            "refresh_token" => Self::RefreshToken,
            other => Self::Api(other.to_owned()),
        }
    }
}

/// Outcome recorded for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    /// Operation completed successfully
    Success,
    /// Operation failed; `error_message` carries the detail
    Error,
}

impl OperationStatus {
    /// Stored string form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    /// Parse the stored string form; unknown values map to `Error`
    #[must_use]
    pub fn from_str_value(value: &str) -> Self {
        match value {
            "success" => Self::Success,
            _ => Self::Error,
        }
    }
}

/// One immutable entry in the append-only operation log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationLogEntry {
    /// Unique entry identifier
    pub id: String,
    /// Advertiser the operation ran on behalf of
    pub advertiser_id: AdvertiserId,
    /// Advertising platform the operation targeted
    pub platform_id: String,
    /// Kind of operation
    pub operation_type: OperationType,
    /// Outcome
    pub status: OperationStatus,
    /// Failure detail; provider error payloads are serialized here opaquely
    pub error_message: Option<String>,
    /// When the entry was recorded
    pub created_at: DateTime<Utc>,
}

impl OperationLogEntry {
    /// Create a successful entry
    #[must_use]
    pub fn success(
        advertiser_id: AdvertiserId,
        platform_id: impl Into<String>,
        operation_type: OperationType,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            advertiser_id,
            platform_id: platform_id.into(),
            operation_type,
            status: OperationStatus::Success,
            error_message: None,
            created_at: Utc::now(),
        }
    }

    /// Create a failed entry carrying the error detail
    #[must_use]
    pub fn error(
        advertiser_id: AdvertiserId,
        platform_id: impl Into<String>,
        operation_type: OperationType,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            advertiser_id,
            platform_id: platform_id.into(),
            operation_type,
            status: OperationStatus::Error,
            error_message: Some(error_message.into()),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_type_round_trips_through_storage_form() {
        assert_eq!(
            OperationType::from_str_value(&OperationType::InitialConnection.to_string()),
            OperationType::InitialConnection
        );
        assert_eq!(
            OperationType::from_str_value(&OperationType::RefreshToken.to_string()),
            OperationType::RefreshToken
        );
        assert_eq!(
            OperationType::from_str_value("list_campaigns"),
            OperationType::Api("list_campaigns".to_owned())
        );
    }

    #[test]
    fn error_entry_carries_message() {
        let entry = OperationLogEntry::error(
            AdvertiserId::new(),
            "amazon_ads",
            OperationType::RefreshToken,
            "invalid_grant",
        );
        assert_eq!(entry.status, OperationStatus::Error);
        assert_eq!(entry.error_message.as_deref(), Some("invalid_grant"));
    }
}
