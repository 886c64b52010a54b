// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::ApiConfig;
use crate::store::{InMemoryProjectStore, InMemoryUserStore, ProjectStore, UserStore};

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// The central state container, passed to handlers via axum's state
/// extraction. Stores are trait objects so tests and future deployments can
/// substitute their own persistence.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: Arc<ApiConfig>,
    /// Token issuer for minting and verification.
    pub issuer: Arc<TokenIssuer>,
    /// Credential store.
    pub users: Arc<dyn UserStore>,
    /// Project store.
    pub projects: Arc<dyn ProjectStore>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the token issuer.
    pub fn issuer(&self) -> &Arc<TokenIssuer> {
        &self.issuer
    }

    /// Returns the credential store.
    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    /// Returns the project store.
    pub fn projects(&self) -> &Arc<dyn ProjectStore> {
        &self.projects
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("issuer", &self.issuer)
            .field("users", &self.users)
            .field("projects", &self.projects)
            .finish()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
pub struct AppStateBuilder {
    config: Option<ApiConfig>,
    issuer: Option<Arc<TokenIssuer>>,
    users: Option<Arc<dyn UserStore>>,
    projects: Option<Arc<dyn ProjectStore>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config: None,
            issuer: None,
            users: None,
            projects: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the token issuer.
    pub fn issuer(mut self, issuer: Arc<TokenIssuer>) -> Self {
        self.issuer = Some(issuer);
        self
    }

    /// Sets the credential store.
    pub fn users(mut self, users: Arc<dyn UserStore>) -> Self {
        self.users = Some(users);
        self
    }

    /// Sets the project store.
    pub fn projects(mut self, projects: Arc<dyn ProjectStore>) -> Self {
        self.projects = Some(projects);
        self
    }

    /// Builds the AppState.
    ///
    /// The issuer is built from the configuration's token section when not
    /// supplied; stores default to the in-memory implementations.
    pub fn build(self) -> crate::error::ApiResult<AppState> {
        let config = self.config.unwrap_or_default();

        let issuer = match self.issuer {
            Some(issuer) => issuer,
            None => Arc::new(TokenIssuer::new(config.tokens.clone())?),
        };

        let users = self
            .users
            .unwrap_or_else(|| Arc::new(InMemoryUserStore::new()));
        let projects = self
            .projects
            .unwrap_or_else(|| Arc::new(InMemoryProjectStore::new()));

        Ok(AppState {
            config: Arc::new(config),
            issuer,
            users,
            projects,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<TokenIssuer> {
    fn from_ref(state: &AppState) -> Self {
        state.issuer.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ApiConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
