// ABOUTME: Append-only operation log storage for connection and API call auditing
// ABOUTME: Entries are inserted once and never mutated or deleted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use super::Database;
use crate::errors::{AppError, AppResult};
use adbridge_core::models::{AdvertiserId, OperationLogEntry, OperationStatus, OperationType};
use sqlx::Row;

impl Database {
    /// Append an entry to the operation log
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn append_operation_log(&self, entry: &OperationLogEntry) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO operation_log (
                id, advertiser_id, platform_id, operation_type, status,
                error_message, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&entry.id)
        .bind(entry.advertiser_id.to_string())
        .bind(&entry.platform_id)
        .bind(entry.operation_type.to_string())
        .bind(entry.status.as_str())
        .bind(entry.error_message.as_deref())
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to append operation log entry: {e}")))?;

        Ok(())
    }

    /// List recent operation log entries for an advertiser, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_operation_log(
        &self,
        advertiser_id: AdvertiserId,
        limit: i64,
    ) -> AppResult<Vec<OperationLogEntry>> {
        let rows = sqlx::query(
            r"
            SELECT id, advertiser_id, platform_id, operation_type, status,
                   error_message, created_at
            FROM operation_log
            WHERE advertiser_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            ",
        )
        .bind(advertiser_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to query operation log: {e}")))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let advertiser_id_str: String = row.get("advertiser_id");
            let operation_type_str: String = row.get("operation_type");
            let status_str: String = row.get("status");

            entries.push(OperationLogEntry {
                id: row.get("id"),
                advertiser_id: advertiser_id_str.parse()?,
                platform_id: row.get("platform_id"),
                operation_type: OperationType::from_str_value(&operation_type_str),
                status: OperationStatus::from_str_value(&status_str),
                error_message: row.get("error_message"),
                created_at: row.get("created_at"),
            });
        }

        Ok(entries)
    }

    /// Count operation log entries for an advertiser
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_operation_log(&self, advertiser_id: AdvertiserId) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM operation_log WHERE advertiser_id = $1")
                .bind(advertiser_id.to_string())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to count operation log: {e}")))?;

        Ok(count)
    }
}
