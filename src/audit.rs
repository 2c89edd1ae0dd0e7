// ABOUTME: Operation auditing for connection and provider API activity
// ABOUTME: Mirrors entries to the structured logger, then persists best-effort
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use crate::database::Database;
use adbridge_core::models::{AdvertiserId, OperationLogEntry, OperationStatus, OperationType};
use std::sync::Arc;
use tracing::{error, info};

/// Auditor writing the append-only operation log
///
/// Logging is a side channel: a failed log write is reported through the
/// structured logger and never changes the outcome of the operation that
/// produced the entry.
pub struct OperationAuditor {
    database: Arc<Database>,
}

impl OperationAuditor {
    /// Create a new operation auditor
    #[must_use]
    pub const fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Log entry to the structured logger based on status
    fn log_to_structured_logger(entry: &OperationLogEntry) {
        match entry.status {
            OperationStatus::Success => {
                info!(
                    entry_id = %entry.id,
                    advertiser_id = %entry.advertiser_id,
                    platform = %entry.platform_id,
                    operation = %entry.operation_type,
                    "Operation completed"
                );
            }
            OperationStatus::Error => {
                error!(
                    entry_id = %entry.id,
                    advertiser_id = %entry.advertiser_id,
                    platform = %entry.platform_id,
                    operation = %entry.operation_type,
                    error = entry.error_message.as_deref().unwrap_or("unknown"),
                    "Operation failed"
                );
            }
        }
    }

    /// Record an entry: structured log first, then best-effort persistence
    pub async fn record(&self, entry: OperationLogEntry) {
        Self::log_to_structured_logger(&entry);

        if let Err(e) = self.database.append_operation_log(&entry).await {
            // The business outcome must never be replaced by a log-write failure
            error!(
                entry_id = %entry.id,
                operation = %entry.operation_type,
                "Failed to persist operation log entry: {e}"
            );
        }
    }

    /// Record a successful operation
    pub async fn record_success(
        &self,
        advertiser_id: AdvertiserId,
        platform_id: &str,
        operation_type: OperationType,
    ) {
        self.record(OperationLogEntry::success(
            advertiser_id,
            platform_id,
            operation_type,
        ))
        .await;
    }

    /// Record a failed operation with its error detail
    pub async fn record_error(
        &self,
        advertiser_id: AdvertiserId,
        platform_id: &str,
        operation_type: OperationType,
        error_message: impl Into<String>,
    ) {
        self.record(OperationLogEntry::error(
            advertiser_id,
            platform_id,
            operation_type,
            error_message,
        ))
        .await;
    }
}
