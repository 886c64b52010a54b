// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session verification middleware.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::auth::{AuthContext, TokenIssuer};
use crate::error::ApiError;

// =============================================================================
// AuthLayer
// =============================================================================

/// Layer for access token verification.
///
/// Wraps services so every non-public request must carry a valid bearer
/// access token. On success the decoded [`AuthContext`] is attached to the
/// request extensions for the role gate and handlers.
#[derive(Clone)]
pub struct AuthLayer {
    issuer: Arc<TokenIssuer>,
    public_paths: Arc<HashSet<String>>,
}

impl AuthLayer {
    /// Creates a new auth layer.
    pub fn new(issuer: Arc<TokenIssuer>) -> Self {
        Self {
            issuer,
            public_paths: Arc::new(HashSet::new()),
        }
    }

    /// Adds public paths that don't require authentication.
    ///
    /// A path ending in `*` matches by prefix.
    pub fn with_public_paths(mut self, paths: Vec<String>) -> Self {
        self.public_paths = Arc::new(paths.into_iter().collect());
        self
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            issuer: self.issuer.clone(),
            public_paths: self.public_paths.clone(),
        }
    }
}

// =============================================================================
// AuthMiddleware
// =============================================================================

/// Middleware for access token verification.
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    issuer: Arc<TokenIssuer>,
    public_paths: Arc<HashSet<String>>,
}

impl<S> AuthMiddleware<S> {
    /// Checks if a path is public.
    fn is_public_path(&self, path: &str) -> bool {
        if self.public_paths.contains(path) {
            return true;
        }

        for public_path in self.public_paths.iter() {
            if let Some(prefix) = public_path.strip_suffix('*') {
                if path.starts_with(prefix) {
                    return true;
                }
            }
        }

        false
    }
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let issuer = self.issuer.clone();
        let is_public = self.is_public_path(req.uri().path());
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if is_public {
                return inner.call(req).await;
            }

            let token = match extract_bearer_token(&req) {
                Some(token) => token,
                None => {
                    tracing::debug!(path = %req.uri().path(), "No authorization token provided");
                    return Ok(
                        ApiError::unauthenticated("No authorization token provided")
                            .into_response(),
                    );
                }
            };

            let claims = match issuer.verify_access(&token) {
                Ok(claims) => claims,
                Err(e) => {
                    tracing::debug!(error = %e, "Access token verification failed");
                    return Ok(e.into_response());
                }
            };

            req.extensions_mut().insert(AuthContext::from_claims(&claims));

            inner.call(req).await
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer ").map(|s| s.to_string()))
}

// =============================================================================
// Tests
// =============================================================================
