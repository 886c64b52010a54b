// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication request/response bodies and the token pair.

use serde::{Deserialize, Serialize};

use crate::role::Role;
use crate::user::UserSummary;

// =============================================================================
// Token pair
// =============================================================================

/// An access/refresh token pair.
///
/// Either half may be absent: `set`-style cache updates skip tokens that were
/// not supplied, and a cleared session reads back as an empty pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived access token, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Long-lived refresh token, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenPair {
    /// Creates a pair with both tokens present.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    /// Creates a pair carrying only an access token.
    pub fn access_only(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: None,
        }
    }

    /// Returns an empty pair.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` when neither token is present.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plaintext password, verified against the stored hash.
    pub password: String,
}

/// Body of `POST /auth/register` (administrator only).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Unique email for the new account.
    pub email: String,
    /// Initial plaintext password.
    pub password: String,
    /// Role granted to the new account.
    pub role: Role,
}

/// Body of `PUT /auth/edit-role` (administrator only).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRoleRequest {
    /// Email of the account to change.
    pub email: String,
    /// New role.
    pub role: Role,
}

/// Body of `POST /auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// The refresh token being redeemed for a new pair.
    pub refresh_token: String,
}

// =============================================================================
// Responses
// =============================================================================

/// Body of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Freshly minted access token.
    pub access_token: String,
    /// Freshly minted refresh token (also stored server-side).
    pub refresh_token: String,
    /// The authenticated user's role, for immediate client routing.
    pub role: Role,
}

/// Body of a successful refresh: the rotated pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    /// New access token.
    pub access_token: String,
    /// New refresh token; the previous one is no longer accepted.
    pub refresh_token: String,
}

impl RefreshResponse {
    /// Converts into a full token pair.
    pub fn into_pair(self) -> TokenPair {
        TokenPair::new(self.access_token, self.refresh_token)
    }
}

/// Body of `GET /auth/check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCheckResponse {
    /// The authenticated user's current profile.
    pub user: UserSummary,
}

/// Generic acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// Creates an acknowledgement.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
