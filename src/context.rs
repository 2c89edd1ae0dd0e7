// ABOUTME: Focused dependency injection context shared across route handlers
// ABOUTME: Constructed once at startup; no module-level client singletons
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use crate::audit::OperationAuditor;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::oauth2_client::ProviderOAuthClient;
use crate::providers::ApiInvoker;
use crate::retry::RetryPolicy;
use crate::tokens::TokenService;
use std::sync::Arc;
use std::time::Duration;

/// Shared server resources, built once at process start
///
/// Every component receives its collaborators through this context instead
/// of reaching for process-wide singletons; the HTTP client and database
/// pool are constructed here and shared read-only thereafter.
pub struct ServerResources {
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
    /// Database with encrypted token storage
    pub database: Arc<Database>,
    /// Token lifecycle service
    pub token_service: Arc<TokenService>,
    /// Resilient provider API invoker
    pub invoker: Arc<ApiInvoker>,
    /// Operation auditor
    pub auditor: Arc<OperationAuditor>,
}

impl ServerResources {
    /// Wire up all server resources from configuration and a database handle
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed
    pub fn new(config: ServerConfig, database: Database) -> AppResult<Arc<Self>> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        let config = Arc::new(config);
        let database = Arc::new(database);
        let auditor = Arc::new(OperationAuditor::new(Arc::clone(&database)));

        let oauth = ProviderOAuthClient::new(http.clone(), config.provider.clone());
        let token_service = Arc::new(TokenService::new(
            Arc::clone(&database),
            oauth,
            Arc::clone(&auditor),
            config.token_skew(),
        ));

        let invoker = Arc::new(ApiInvoker::new(
            http,
            Arc::clone(&token_service),
            Arc::clone(&auditor),
            config.provider.clone(),
            RetryPolicy::from(config.retry),
        ));

        Ok(Arc::new(Self {
            config,
            database,
            token_service,
            invoker,
            auditor,
        }))
    }
}
