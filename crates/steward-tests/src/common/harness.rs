// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! Spawns a real API server on an ephemeral port for each test.
//!
//! ## Design Principles
//!
//! - Every test gets its own server, state, and port
//! - Shutdown is graceful on request and forced on drop
//! - Direct store access stays available for seeding and sabotage

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use steward_api::auth::TokenConfig;
use steward_api::store::UserRecord;
use steward_api::{password, ApiConfig, ApiServer, AppState};
use steward_client::ApiClient;
use steward_core::UserSummary;

use super::fixtures::TestAccount;

/// Access-token secret used by every test server.
pub const TEST_ACCESS_SECRET: &str = "integration-access-secret-0123456789abcdef";

/// Refresh-token secret used by every test server.
pub const TEST_REFRESH_SECRET: &str = "integration-refresh-secret-0123456789abcdef";

// =============================================================================
// TestServerOptions
// =============================================================================

/// Token lifetimes for a spawned test server.
#[derive(Debug, Clone)]
pub struct TestServerOptions {
    /// Access token lifetime in seconds.
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_ttl_secs: i64,
}

impl Default for TestServerOptions {
    fn default() -> Self {
        Self {
            access_ttl_secs: 900,
            refresh_ttl_secs: 86400,
        }
    }
}

impl TestServerOptions {
    /// Options that expire access tokens after one second.
    ///
    /// Paired with zero verification leeway, a two-second sleep is enough
    /// to force the expiry path.
    pub fn short_access_ttl() -> Self {
        Self {
            access_ttl_secs: 1,
            ..Default::default()
        }
    }
}

// =============================================================================
// TestServer
// =============================================================================

/// A running API server bound to an ephemeral localhost port.
pub struct TestServer {
    addr: SocketAddr,
    state: AppState,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawns a server with default token lifetimes.
    pub async fn spawn() -> Self {
        Self::spawn_with(TestServerOptions::default()).await
    }

    /// Spawns a server with the given token lifetimes.
    pub async fn spawn_with(options: TestServerOptions) -> Self {
        let mut config = ApiConfig::default()
            .with_host(Ipv4Addr::LOCALHOST.into())
            .with_port(0)
            .with_tokens(
                TokenConfig::new(TEST_ACCESS_SECRET, TEST_REFRESH_SECRET)
                    .with_access_ttl(options.access_ttl_secs)
                    .with_refresh_ttl(options.refresh_ttl_secs),
            );
        // Expiry must be exact for the short-TTL suites
        config.tokens.leeway_secs = 0;

        let state = AppState::builder()
            .config(config)
            .build()
            .expect("Failed to build app state");
        let server = ApiServer::new(state.clone());

        // Binding happens here so the assigned port is known before the
        // server task starts; connections queue in the accept backlog until
        // it does.
        let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("Failed to bind ephemeral port");
        let addr = listener.local_addr().expect("Failed to read bound address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _ = server
                .serve_with_shutdown(listener, async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
            handle,
        }
    }

    /// The server's bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL including the API prefix.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// URL of a path under the API prefix.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// URL of a path outside the API prefix (probes live at the root).
    pub fn root_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Direct access to the server's state for seeding and sabotage.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// A fresh SDK client with an in-memory token cache.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.base_url()).expect("Failed to build client")
    }

    /// A fresh SDK client persisting its session to the given file.
    pub fn client_with_session_file(&self, path: impl AsRef<Path>) -> ApiClient {
        ApiClient::builder(self.base_url())
            .session_file(path.as_ref().to_path_buf())
            .build()
            .expect("Failed to build client")
    }

    /// Seeds an account directly into the credential store.
    pub async fn seed_account(&self, account: &TestAccount) -> UserSummary {
        let hash = password::hash_password(&account.password).expect("Failed to hash password");
        let record = UserRecord::new(
            account.name.clone(),
            account.email.clone(),
            hash,
            account.role,
        );
        self.state
            .users()
            .insert(record)
            .await
            .expect("Failed to seed account")
    }

    /// A client already logged in as the given account.
    pub async fn login_client(&self, account: &TestAccount) -> ApiClient {
        let client = self.client();
        client
            .login(&account.email, &account.password)
            .await
            .expect("Login failed");
        client
    }

    /// Mints a valid access token for raw-request tests.
    pub fn issue_access_for(&self, summary: &UserSummary) -> String {
        self.state
            .issuer()
            .issue_access(summary.id, &summary.email, summary.role)
            .expect("Failed to issue access token")
    }

    /// Shuts the server down gracefully and waits for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.handle).await;
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.abort();
    }
}
