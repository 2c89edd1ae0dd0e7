// ABOUTME: Model module organization for shared Adbridge DTOs
// ABOUTME: Exposes identifier newtypes, credential records, and operation log entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

/// Persisted credential record for a platform connection
pub mod credential;
/// Append-only operation log DTOs
pub mod operation_log;

pub use credential::PlatformCredential;
pub use operation_log::{OperationLogEntry, OperationStatus, OperationType};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

/// Strongly typed advertiser identifier
///
/// Wraps a UUID so advertiser ids cannot be confused with credential ids or
/// other string-typed values at API boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvertiserId(Uuid);

impl AdvertiserId {
    /// Create an advertiser id from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random advertiser id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AdvertiserId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for AdvertiserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AdvertiserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl From<Uuid> for AdvertiserId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
