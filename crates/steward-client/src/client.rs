// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Typed HTTP client.
//!
//! Every protected call is stamped with the access token read from the
//! cache at dispatch time. On a 401 the client refreshes once through the
//! single-flight [`Session`] and re-dispatches the original request exactly
//! once; any further 401 propagates.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use steward_core::{
    AssignDeveloperRequest, CreateProjectRequest, EditRoleRequest, LoginRequest, LoginResponse,
    MessageResponse, Project, RefreshRequest, RefreshResponse, RegisterRequest, Role,
    SessionCheckResponse, TokenPair, UpdateProjectRequest, UserSummary,
};
use tracing::debug;
use uuid::Uuid;

use crate::cache::TokenCache;
use crate::error::{ClientError, ClientResult};
use crate::session::{Refresher, Session};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Steward HTTP API.
///
/// Cheap to clone; clones share the connection pool and session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
    refresher: HttpRefresher,
}

impl ApiClient {
    /// Creates a client with default options.
    ///
    /// `base_url` includes the API prefix, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::builder(base_url).build()
    }

    /// Returns a builder for customizing the client.
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(base_url)
    }

    /// Returns the session (single-flight refresh state).
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Returns the token cache.
    pub fn cache(&self) -> &Arc<TokenCache> {
        self.session.cache()
    }

    // =========================================================================
    // Auth endpoints
    // =========================================================================

    /// Logs in and installs the returned pair as the current session.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self
            .request(Method::POST, "/auth/login", Some(&request), false)
            .await?;

        self.cache().set(&TokenPair::new(
            response.access_token.clone(),
            response.refresh_token.clone(),
        ))?;
        Ok(response)
    }

    /// Registers a new user (administrator session required).
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> ClientResult<MessageResponse> {
        let request = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
        };
        self.request(Method::POST, "/auth/register", Some(&request), true)
            .await
    }

    /// Changes a user's role (administrator session required).
    pub async fn edit_role(&self, email: &str, role: Role) -> ClientResult<MessageResponse> {
        let request = EditRoleRequest {
            email: email.to_string(),
            role,
        };
        self.request(Method::PUT, "/auth/edit-role", Some(&request), true)
            .await
    }

    /// Logs out.
    ///
    /// The local session ends whatever the server said: cached tokens are
    /// cleared before the server's answer is surfaced.
    pub async fn logout(&self) -> ClientResult<MessageResponse> {
        let result = self
            .request(Method::POST, "/auth/logout", None::<&()>, true)
            .await;
        self.session.clear()?;
        result
    }

    /// Confirms the current access token is still accepted.
    pub async fn check_auth(&self) -> ClientResult<SessionCheckResponse> {
        self.request(Method::GET, "/auth/check", None::<&()>, true)
            .await
    }

    // =========================================================================
    // User endpoints
    // =========================================================================

    /// Lists all users (administrator session required).
    pub async fn users(&self) -> ClientResult<Vec<UserSummary>> {
        self.request(Method::GET, "/users", None::<&()>, true).await
    }

    // =========================================================================
    // Project endpoints
    // =========================================================================

    /// Lists the projects visible to the current session's role.
    pub async fn projects(&self) -> ClientResult<Vec<Project>> {
        self.request(Method::GET, "/projects", None::<&()>, true)
            .await
    }

    /// Creates a project (administrator session required).
    pub async fn create_project(&self, request: &CreateProjectRequest) -> ClientResult<Project> {
        self.request(Method::POST, "/projects", Some(request), true)
            .await
    }

    /// Updates a project's details (administrator session required).
    pub async fn update_project(
        &self,
        id: Uuid,
        request: &UpdateProjectRequest,
    ) -> ClientResult<Project> {
        self.request(
            Method::PATCH,
            &format!("/projects/{id}/update"),
            Some(request),
            true,
        )
        .await
    }

    /// Marks a project completed (administrator session required).
    pub async fn complete_project(&self, id: Uuid) -> ClientResult<MessageResponse> {
        self.request(
            Method::PATCH,
            &format!("/projects/{id}/complete"),
            None::<&()>,
            true,
        )
        .await
    }

    /// Deletes a project (administrator session required).
    pub async fn delete_project(&self, id: Uuid) -> ClientResult<MessageResponse> {
        self.request(
            Method::DELETE,
            &format!("/projects/{id}/delete"),
            None::<&()>,
            true,
        )
        .await
    }

    /// Assigns a developer to a project (lead session required).
    pub async fn assign_developer(
        &self,
        id: Uuid,
        developer_email: &str,
    ) -> ClientResult<MessageResponse> {
        let request = AssignDeveloperRequest {
            developer_email: developer_email.to_string(),
        };
        self.request(
            Method::PATCH,
            &format!("/projects/{id}/assign"),
            Some(&request),
            true,
        )
        .await
    }

    // =========================================================================
    // Request pipeline
    // =========================================================================

    /// Sends a request, refreshing and retrying once on a 401.
    async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authenticated: bool,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let epoch = self.session.epoch();
        let response = self.dispatch(method.clone(), path, body, authenticated).await?;

        if !authenticated || response.status() != StatusCode::UNAUTHORIZED {
            return read_response(response).await;
        }

        // The original failure is held while the silent refresh runs; the
        // waiters of a failed shared refresh propagate it unchanged.
        let original = response_error(response).await;
        debug!(path, "Request unauthenticated, attempting silent refresh");

        match self.session.refresh(&self.refresher, epoch).await {
            Ok(_) => {}
            Err(ClientError::NoSession) => return Err(original),
            Err(err) => return Err(err),
        }

        let retried = self.dispatch(method, path, body, authenticated).await?;
        read_response(retried).await
    }

    /// Builds and sends one request, stamping the bearer token read from
    /// the cache at this moment.
    async fn dispatch<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authenticated: bool,
    ) -> ClientResult<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, url);

        if authenticated {
            if let Some(token) = self.cache().access_token() {
                builder = builder.bearer_auth(token);
            }
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }
}

/// Deserializes a success body, or converts the failure into [`ClientError`].
async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        Err(response_error(response).await)
    }
}

/// Converts a failed response into a structured error.
async fn response_error(response: reqwest::Response) -> ClientError {
    let status = response.status();
    match response.bytes().await {
        Ok(body) => ClientError::from_response_body(status, &body),
        Err(err) => ClientError::Http(err),
    }
}

// =============================================================================
// HttpRefresher
// =============================================================================

/// The network refresher: posts to `/auth/refresh` outside the retrying
/// pipeline, so a refresh can never trigger another refresh.
#[derive(Debug, Clone)]
struct HttpRefresher {
    http: reqwest::Client,
    url: String,
}

#[async_trait]
impl Refresher for HttpRefresher {
    async fn refresh(&self, refresh_token: &str) -> ClientResult<RefreshResponse> {
        let request = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let response = self.http.post(&self.url).json(&request).send().await?;
        read_response(response).await
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`ApiClient`].
#[derive(Debug)]
pub struct ApiClientBuilder {
    base_url: String,
    session_file: Option<PathBuf>,
    timeout: Duration,
}

impl ApiClientBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            session_file: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Persists the session to the given file across restarts.
    pub fn session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the client.
    pub fn build(self) -> ClientResult<ApiClient> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;

        let cache = Arc::new(match self.session_file {
            Some(path) => TokenCache::with_persistence(path),
            None => TokenCache::in_memory(),
        });
        let session = Arc::new(Session::new(cache));

        let base_url = self.base_url.trim_end_matches('/').to_string();
        let refresher = HttpRefresher {
            http: http.clone(),
            url: format!("{}/auth/refresh", base_url),
        };

        Ok(ApiClient {
            http,
            base_url,
            session,
            refresher,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:8080/api/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/api");
        assert_eq!(
            client.refresher.url,
            "http://localhost:8080/api/auth/refresh"
        );
    }

    #[test]
    fn test_builder_with_session_file_seeds_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(
            &path,
            r#"{"accessToken":"acc","refreshToken":"ref"}"#,
        )
        .unwrap();

        let client = ApiClient::builder("http://localhost:8080/api")
            .session_file(&path)
            .build()
            .unwrap();
        assert_eq!(client.cache().access_token().as_deref(), Some("acc"));
    }

    #[test]
    fn test_default_cache_is_empty() {
        let client = ApiClient::new("http://localhost:8080/api").unwrap();
        assert!(client.cache().get().is_empty());
    }
}
