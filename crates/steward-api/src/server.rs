// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    handler::Handler,
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post, put},
    Router,
};
use steward_core::Role;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::handlers;
use crate::middleware::{AuthLayer, RoleLayer};
use crate::state::AppState;

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
///
/// This is the main entry point for creating and running the HTTP server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ApiConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Creates the router with all routes and middleware.
    ///
    /// The session verifier wraps every route except the probes, login and
    /// refresh; role gates sit on individual routes so a verified identity
    /// with the wrong role reads as `Forbidden`, not `Unauthenticated`.
    pub fn router(&self) -> Router {
        let base = self.config.base_path.trim_end_matches('/').to_string();
        let at = |suffix: &str| format!("{}{}", base, suffix);

        let cors = create_cors_layer(&self.config);
        let auth = AuthLayer::new(self.state.issuer().clone()).with_public_paths(vec![
            "/health".to_string(),
            "/ready".to_string(),
            at("/auth/login"),
            at("/auth/refresh"),
        ]);

        let middleware_stack = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(self.config.request_timeout))
            .layer(cors)
            .layer(auth);

        let admin_only = RoleLayer::require(Role::Admin);
        let lead_only = RoleLayer::require(Role::Lead);

        Router::new()
            // Probes (public)
            .route("/health", get(handlers::health))
            .route("/ready", get(handlers::ready))
            // Session endpoints
            .route(&at("/auth/login"), post(handlers::login))
            .route(&at("/auth/refresh"), post(handlers::refresh))
            .route(
                &at("/auth/register"),
                post(handlers::register.layer(admin_only.clone())),
            )
            .route(
                &at("/auth/edit-role"),
                put(handlers::edit_role.layer(admin_only.clone())),
            )
            .route(&at("/auth/logout"), post(handlers::logout))
            .route(&at("/auth/check"), get(handlers::check))
            // User directory
            .route(
                &at("/users"),
                get(handlers::list_users.layer(admin_only.clone())),
            )
            // Project endpoints
            .route(
                &at("/projects"),
                get(handlers::list_projects)
                    .post(handlers::create_project.layer(admin_only.clone())),
            )
            .route(
                &at("/projects/{id}/update"),
                patch(handlers::update_project.layer(admin_only.clone())),
            )
            .route(
                &at("/projects/{id}/complete"),
                patch(handlers::complete_project.layer(admin_only.clone())),
            )
            .route(
                &at("/projects/{id}/delete"),
                delete(handlers::delete_project.layer(admin_only)),
            )
            .route(
                &at("/projects/{id}/assign"),
                patch(handlers::assign_developer.layer(lead_only)),
            )
            // Apply middleware and state
            .layer(middleware_stack)
            .with_state(self.state.clone())
    }

    /// Runs the server.
    pub async fn run(self) -> ApiResult<()> {
        let addr = self.config.socket_addr();
        let router = self.router();

        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind: {}", e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Runs the server with graceful shutdown.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = self.config.socket_addr();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind: {}", e)))?;

        self.serve_with_shutdown(listener, shutdown_signal).await
    }

    /// Serves on an already-bound listener until the signal resolves.
    ///
    /// Binding is the caller's step here, so a listener bound to port 0 can
    /// report its assigned port before the server starts accepting.
    pub async fn serve_with_shutdown(
        self,
        listener: tokio::net::TcpListener,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        let addr = listener
            .local_addr()
            .map_err(|e| ApiError::internal(format!("Failed to read bound address: {}", e)))?;
        let router = self.router();

        info!("Starting API server on {}", addr);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Creates the CORS layer from configuration.
///
/// A wildcard origin never sends credentials; the two are mutually
/// exclusive on the wire, and tower-http refuses the combination.
fn create_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = &config.cors;
    let max_age = Duration::from_secs(cors.max_age);

    if cors.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .max_age(max_age);
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    let mut layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(max_age);

    if cors.allow_credentials {
        layer = layer.allow_credentials(true);
    }

    layer
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
pub struct ApiServerBuilder {
    state_builder: crate::state::AppStateBuilder,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self {
            state_builder: AppState::builder(),
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the token issuer.
    pub fn issuer(mut self, issuer: Arc<crate::auth::TokenIssuer>) -> Self {
        self.state_builder = self.state_builder.issuer(issuer);
        self
    }

    /// Sets the user store.
    pub fn users(mut self, users: Arc<dyn crate::store::UserStore>) -> Self {
        self.state_builder = self.state_builder.users(users);
        self
    }

    /// Sets the project store.
    pub fn projects(mut self, projects: Arc<dyn crate::store::ProjectStore>) -> Self {
        self.state_builder = self.state_builder.projects(projects);
        self
    }

    /// Builds the server.
    pub fn build(self) -> ApiResult<ApiServer> {
        let state = self.state_builder.build()?;
        Ok(ApiServer::new(state))
    }
}

impl Default for ApiServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenConfig;
    use crate::config::CorsConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_config() -> ApiConfig {
        ApiConfig::default().with_tokens(TokenConfig::new(
            "access-secret-that-is-long-enough-for-tests",
            "refresh-secret-that-is-long-enough-for-tests",
        ))
    }

    #[test]
    fn test_server_builder() {
        let server = ApiServerBuilder::new()
            .config(test_config())
            .build()
            .unwrap();

        assert_eq!(server.addr().port(), 8080);
    }

    #[test]
    fn test_router_creation() {
        let server = ApiServerBuilder::new()
            .config(test_config())
            .build()
            .unwrap();

        let _router = server.router();
        // If we get here, every route path parsed
    }

    #[test]
    fn test_cors_layer_with_named_origins_and_credentials() {
        let mut config = test_config();
        // strict() enables credentials; named origins keep that combination legal
        config.cors = CorsConfig::strict(vec!["https://app.example.com".to_string()]);

        let _layer = create_cors_layer(&config);
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let server = ApiServerBuilder::new()
            .config(test_config())
            .build()
            .unwrap();

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_projects_requires_token() {
        let server = ApiServerBuilder::new()
            .config(test_config())
            .build()
            .unwrap();

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/projects")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_role_gate_on_user_listing() {
        let server = ApiServerBuilder::new()
            .config(test_config())
            .build()
            .unwrap();
        let issuer = server.state.issuer().clone();

        let token = issuer
            .issue_access(
                uuid::Uuid::now_v7(),
                "dev@example.com",
                Role::Developer,
            )
            .unwrap();

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/api/users")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
