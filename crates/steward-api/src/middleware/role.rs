// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role gate middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use steward_core::Role;
use tower::{Layer, Service};

use crate::auth::AuthContext;
use crate::error::ApiError;

// =============================================================================
// RoleLayer
// =============================================================================

/// Layer restricting a route to a set of roles.
///
/// Composes after [`AuthLayer`](super::AuthLayer): it only inspects the
/// authentication context the verifier attached. A verified identity with
/// the wrong role is `Forbidden`, never `Unauthenticated`.
#[derive(Clone)]
pub struct RoleLayer {
    allowed: Arc<Vec<Role>>,
}

impl RoleLayer {
    /// Creates a gate allowing a single role.
    pub fn require(role: Role) -> Self {
        Self {
            allowed: Arc::new(vec![role]),
        }
    }

    /// Creates a gate allowing any of the given roles.
    pub fn require_any(roles: Vec<Role>) -> Self {
        Self {
            allowed: Arc::new(roles),
        }
    }
}

impl<S> Layer<S> for RoleLayer {
    type Service = RoleMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RoleMiddleware {
            inner,
            allowed: self.allowed.clone(),
        }
    }
}

// =============================================================================
// RoleMiddleware
// =============================================================================

/// Middleware enforcing the role gate.
#[derive(Clone)]
pub struct RoleMiddleware<S> {
    inner: S,
    allowed: Arc<Vec<Role>>,
}

impl<S> Service<Request<Body>> for RoleMiddleware<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let allowed = self.allowed.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let auth_ctx = req.extensions().get::<AuthContext>().cloned();

            match auth_ctx {
                Some(ctx) if ctx.has_any_role(&allowed) => inner.call(req).await,
                Some(ctx) => {
                    tracing::warn!(
                        user_id = %ctx.user_id,
                        role = %ctx.role,
                        required = ?allowed.as_slice(),
                        "Role gate denied access"
                    );
                    Ok(ApiError::forbidden("Insufficient role").into_response())
                }
                None => {
                    tracing::warn!("No auth context found, denying access");
                    Ok(ApiError::unauthenticated("Authentication required").into_response())
                }
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessClaims;
    use std::convert::Infallible;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn mock_service() -> impl Service<
        Request<Body>,
        Response = Response,
        Error = Infallible,
        Future = impl Future<Output = Result<Response, Infallible>> + Send,
    > + Clone
           + Send {
        tower::service_fn(|_req| async { Ok::<_, Infallible>(Response::new(Body::empty())) })
    }

    fn context_with_role(role: Role) -> AuthContext {
        let claims = AccessClaims::new(Uuid::now_v7(), "user@example.com", role, 900);
        AuthContext::from_claims(&claims)
    }

    #[tokio::test]
    async fn test_role_gate_allows_matching_role() {
        let mut service = RoleLayer::require(Role::Admin).layer(mock_service());

        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        req.extensions_mut().insert(context_with_role(Role::Admin));

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_role_gate_rejects_other_role_with_forbidden() {
        let mut service = RoleLayer::require(Role::Admin).layer(mock_service());

        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(context_with_role(Role::Developer));

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        // Forbidden, never Unauthenticated, for a verified identity
        assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_role_gate_require_any() {
        let mut service =
            RoleLayer::require_any(vec![Role::Admin, Role::Lead]).layer(mock_service());

        let mut req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        req.extensions_mut().insert(context_with_role(Role::Lead));

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_role_gate_without_context_unauthenticated() {
        let mut service = RoleLayer::require(Role::Admin).layer(mock_service());

        let req = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = service.ready().await.unwrap().call(req).await.unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
