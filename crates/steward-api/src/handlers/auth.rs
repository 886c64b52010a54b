// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication handlers.
//!
//! Login, registration, role editing, session check, and the refresh
//! coordinator. Route-level gates (ADMIN for register/edit-role) live in the
//! router; handlers here only add the checks that need request data.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use steward_core::{
    EditRoleRequest, LoginRequest, LoginResponse, MessageResponse, RefreshResponse,
    RegisterRequest, SessionCheckResponse,
};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, ValidatedJson};
use crate::password;
use crate::state::AppState;
use crate::store::{SwapOutcome, UserRecord};

// =============================================================================
// Login
// =============================================================================

/// POST /api/auth/login
///
/// Verifies credentials and opens a session: mints both tokens and stores
/// the refresh token as the user's single outstanding session, replacing
/// any previous one. Unknown email and wrong password are indistinguishable
/// to the caller.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users()
        .get_by_email(&request.email)
        .await?
        .ok_or_else(|| ApiError::unauthenticated("Invalid credentials"))?;

    let presented = request.password;
    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || password::verify_password(&presented, &hash))
        .await
        .map_err(|e| ApiError::internal(format!("Password verification task failed: {}", e)))?;

    if !valid {
        return Err(ApiError::unauthenticated("Invalid credentials"));
    }

    let access_token = state
        .issuer()
        .issue_access(user.id, &user.email, user.role)?;
    let refresh_token = state.issuer().issue_refresh(user.id)?;

    state.users().set_refresh_token(user.id, &refresh_token).await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        refresh_token,
        role: user.role,
    }))
}

// =============================================================================
// Register
// =============================================================================

/// POST /api/auth/register (ADMIN)
///
/// Creates an account with the requested role.
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.name.is_empty() || request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::validation(
            "Name, email, and password are required",
        ));
    }

    let plaintext = request.password;
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plaintext))
        .await
        .map_err(|e| ApiError::internal(format!("Password hashing task failed: {}", e)))??;

    let record = UserRecord::new(request.name, request.email, password_hash, request.role);
    let summary = state.users().insert(record).await?;

    tracing::info!(user_id = %summary.id, role = %summary.role, "User created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created")),
    ))
}

// =============================================================================
// Edit Role
// =============================================================================

/// PUT /api/auth/edit-role (ADMIN)
///
/// Changes an account's role, keyed by email. Outstanding access tokens
/// keep their embedded role until expiry; the change lands on the next
/// login or refresh.
pub async fn edit_role(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EditRoleRequest>,
) -> ApiResult<impl IntoResponse> {
    let updated = state
        .users()
        .update_role(&request.email, request.role)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    tracing::info!(user_id = %updated.id, role = %updated.role, "User role updated");

    Ok(Json(MessageResponse::new("User role updated")))
}

// =============================================================================
// Refresh
// =============================================================================

/// Body of the refresh endpoint.
///
/// The token field is optional at this boundary: a missing token is a 401,
/// not a malformed-body 422.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshBody {
    /// The refresh token being redeemed, if supplied.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// POST /api/auth/refresh
///
/// Redeems a refresh token for a rotated pair. The presented token must
/// verify cryptographically AND equal the stored per-user value; the store
/// swap is atomic, so of two racing attempts with the same token at most
/// one rotates and the loser sees the same rejection as any stale token.
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RefreshBody>,
) -> ApiResult<impl IntoResponse> {
    let presented = match request.refresh_token {
        Some(token) if !token.is_empty() => token,
        _ => return Err(ApiError::unauthenticated("Refresh token required")),
    };

    let claims = state.issuer().verify_refresh(&presented)?;

    let user = state
        .users()
        .get(claims.sub)
        .await?
        .ok_or_else(|| ApiError::invalid_token("Invalid refresh token"))?;

    // Role is re-read from the store, so a role change takes effect here
    let access_token = state
        .issuer()
        .issue_access(user.id, &user.email, user.role)?;
    let refresh_token = state.issuer().issue_refresh(user.id)?;

    match state
        .users()
        .swap_refresh_token(user.id, &presented, &refresh_token)
        .await?
    {
        SwapOutcome::Updated => {}
        SwapOutcome::Missing | SwapOutcome::Mismatch => {
            return Err(ApiError::invalid_token("Invalid refresh token"));
        }
    }

    tracing::debug!(user_id = %user.id, "Session rotated");

    Ok(Json(RefreshResponse {
        access_token,
        refresh_token,
    }))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /api/auth/logout (authenticated)
///
/// Ends the session by clearing the stored refresh token, regardless of the
/// token's remaining validity.
pub async fn logout(State(state): State<AppState>, Auth(ctx): Auth) -> ApiResult<impl IntoResponse> {
    if !state.users().clear_refresh_token(ctx.user_id).await? {
        return Err(ApiError::not_found("User"));
    }

    tracing::info!(user_id = %ctx.user_id, "User logged out");

    Ok(Json(MessageResponse::new("Logged out")))
}

// =============================================================================
// Session Check
// =============================================================================

/// GET /api/auth/check (authenticated)
///
/// Confirms the access token is still valid and returns the fresh profile.
/// No side effects; route guards poll this on navigation.
pub async fn check(State(state): State<AppState>, Auth(ctx): Auth) -> ApiResult<impl IntoResponse> {
    let user = state
        .users()
        .get(ctx.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(SessionCheckResponse {
        user: user.summary(),
    }))
}

// =============================================================================
// Tests
// =============================================================================
