// ABOUTME: Adbridge server binary: configuration, database, and HTTP serving
// ABOUTME: Wires resources once at startup and runs until shutdown signal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Adbridge Contributors

use adbridge::config::ServerConfig;
use adbridge::context::ServerResources;
use adbridge::database::{generate_encryption_key, Database};
use adbridge::errors::{AppError, AppResult};
use adbridge::{logging, routes};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::Parser;
use tracing::{info, warn};

/// Adbridge campaign management server
#[derive(Parser)]
#[command(name = "adbridge-server", version, about)]
struct Args {
    /// Override the HTTP listen port
    #[arg(long)]
    port: Option<u16>,

    /// Override the database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    logging::init();

    let args = Args::parse();
    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.http_port = port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    let encryption_key = load_encryption_key(&config)?;
    let database = Database::new(&config.database_url, encryption_key).await?;

    let port = config.http_port;
    let resources = ServerResources::new(config, database)?;
    let app = routes::router(resources);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind port {port}: {e}")))?;

    info!("Adbridge server listening on port {port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}

/// Load the token encryption key from configuration, generating an ephemeral
/// one when unset (tokens stored with it do not survive a restart)
fn load_encryption_key(config: &ServerConfig) -> AppResult<Vec<u8>> {
    match &config.encryption_key_b64 {
        Some(encoded) => {
            let key = STANDARD.decode(encoded).map_err(|e| {
                AppError::configuration(format!("ADBRIDGE_ENCRYPTION_KEY is not valid base64: {e}"))
            })?;
            if key.len() != 32 {
                return Err(AppError::configuration(
                    "ADBRIDGE_ENCRYPTION_KEY must decode to exactly 32 bytes",
                ));
            }
            Ok(key)
        }
        None => {
            warn!("ADBRIDGE_ENCRYPTION_KEY not set; using an ephemeral key for this process");
            generate_encryption_key()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
    }
    info!("Shutdown signal received");
}
