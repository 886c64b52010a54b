// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! This module provides the core runtime that orchestrates the Steward
//! server:
//!
//! - Configuration loading and validation
//! - Bootstrap admin seeding
//! - API server with authentication middleware
//! - Graceful shutdown coordination

use std::net::IpAddr;
use std::path::Path;

use tracing::info;

use steward_api::store::UserRecord;
use steward_api::{password, ApiConfig, ApiServer, AppState};
use steward_core::Role;

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// ServiceRuntime
// =============================================================================

/// The main runtime that drives the API server.
///
/// The runtime is responsible for:
/// - Validating configuration before anything binds
/// - Seeding the bootstrap admin account
/// - Serving the API until shutdown is signaled
pub struct ServiceRuntime {
    config: ApiConfig,
    shutdown: ShutdownCoordinator,
}

impl ServiceRuntime {
    /// Creates a new service runtime.
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            shutdown: ShutdownCoordinator::new(),
        }
    }

    /// Returns the shutdown coordinator driving this runtime.
    pub fn shutdown_coordinator(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Runs the server until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!("Starting Steward v{}", steward_api::VERSION);

        self.config
            .validate()
            .map_err(|e| BinError::Configuration(e.to_string()))?;

        let state = AppState::builder().config(self.config.clone()).build()?;
        seed_bootstrap_admin(&state).await?;

        let server = ApiServer::new(state);
        info!(
            "Steward is ready (API: {}{})",
            server.addr(),
            self.config.base_path
        );

        // Listen for OS signals in the background; the server gets a future
        // that resolves once any of them arrives.
        let signal = self.shutdown.shutdown_signal();
        let coordinator = self.shutdown.clone();
        tokio::spawn(async move {
            coordinator.wait_for_shutdown().await;
        });

        server.run_with_shutdown(signal.wait()).await?;

        info!("Steward shutdown complete");

        Ok(())
    }
}

// =============================================================================
// Bootstrap Admin
// =============================================================================

/// Seeds the configured bootstrap admin into the credential store.
///
/// Seeding is idempotent: an existing account with the configured email is
/// left untouched, so restarts never clobber a rotated password or an
/// edited role.
async fn seed_bootstrap_admin(state: &AppState) -> BinResult<()> {
    let Some(admin) = state.config.bootstrap_admin.clone() else {
        return Ok(());
    };

    if state.users().get_by_email(&admin.email).await?.is_some() {
        info!(email = %admin.email, "Bootstrap admin already present");
        return Ok(());
    }

    let password_hash = password::hash_password(&admin.password)?;
    let record = UserRecord::new(
        admin.name.clone(),
        admin.email.clone(),
        password_hash,
        Role::Admin,
    );
    state.users().insert(record).await?;

    info!(email = %admin.email, "Bootstrap admin created");
    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the service runtime.
pub struct RuntimeBuilder {
    config_path: Option<std::path::PathBuf>,
    config: Option<ApiConfig>,
    host: Option<IpAddr>,
    port: Option<u16>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_path: None,
            config: None,
            host: None,
            port: None,
        }
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the bind address from the configuration.
    pub fn host(mut self, host: IpAddr) -> Self {
        self.host = Some(host);
        self
    }

    /// Overrides the bind port from the configuration.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<ServiceRuntime> {
        let mut config = match self.config {
            Some(cfg) => cfg,
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::Configuration("No configuration provided".into()))?;

                if !path.exists() {
                    return Err(BinError::Configuration(format!(
                        "Configuration file not found: {}",
                        path.display()
                    )));
                }

                ApiConfig::load(&path).map_err(|e| {
                    BinError::Configuration(format!("Failed to load config from {:?}: {}", path, e))
                })?
            }
        };

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }

        Ok(ServiceRuntime::new(config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
