// ABOUTME: Core data models shared across Adbridge crates
// ABOUTME: Identifier newtypes, credential records, and operation log DTOs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

#![deny(unsafe_code)]

//! # Adbridge Core
//!
//! Shared data models for the Adbridge platform: strongly typed identifiers,
//! the persisted credential record for advertising platform connections, and
//! the append-only operation log DTOs.

/// Shared data model definitions
pub mod models;

pub use models::{
    AdvertiserId, OperationLogEntry, OperationStatus, OperationType, PlatformCredential,
};
