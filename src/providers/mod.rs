// ABOUTME: Advertising provider operation types and the resilient API invoker
// ABOUTME: Logical campaign operations mapped onto raw provider HTTP requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

/// Resilient provider API invocation
pub mod invoker;

pub use invoker::{ApiInvoker, ApiRequest, ApiResponse};

use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Logical advertising API operations
///
/// The operation name is what lands in the operation log; the HTTP shape of
/// each call is supplied by the caller through [`ApiRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiOperation {
    /// List campaigns for the scoped profile
    ListCampaigns,
    /// Fetch a single campaign
    GetCampaign,
    /// Create a new campaign
    CreateCampaign,
    /// Adjust a campaign budget
    AdjustBudget,
    /// Fetch a campaign performance report
    GetCampaignReport,
}

impl Display for ApiOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::ListCampaigns => write!(f, "list_campaigns"),
            Self::GetCampaign => write!(f, "get_campaign"),
            Self::CreateCampaign => write!(f, "create_campaign"),
            Self::AdjustBudget => write!(f, "adjust_budget"),
            Self::GetCampaignReport => write!(f, "get_campaign_report"),
        }
    }
}

impl FromStr for ApiOperation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "list_campaigns" => Ok(Self::ListCampaigns),
            "get_campaign" => Ok(Self::GetCampaign),
            "create_campaign" => Ok(Self::CreateCampaign),
            "adjust_budget" => Ok(Self::AdjustBudget),
            "get_campaign_report" => Ok(Self::GetCampaignReport),
            _ => Err(AppError::invalid_input(format!(
                "Unsupported operation: {s}"
            ))),
        }
    }
}
