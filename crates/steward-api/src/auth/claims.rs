// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT claims for the two token classes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use steward_core::Role;
use uuid::Uuid;

// =============================================================================
// Access claims
// =============================================================================

/// Claims embedded in an access token.
///
/// Carries everything a protected request needs, so verification never
/// touches the credential store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the user id.
    pub sub: Uuid,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// JWT ID.
    pub jti: Uuid,

    /// User's email.
    pub email: String,

    /// User's role at issue time.
    pub role: Role,
}

impl AccessClaims {
    /// Creates claims for a user, expiring `expires_in_secs` from now.
    pub fn new(user_id: Uuid, email: impl Into<String>, role: Role, expires_in_secs: i64) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: user_id,
            exp: now + expires_in_secs,
            iat: now,
            iss: None,
            jti: Uuid::now_v7(),
            email: email.into(),
            role,
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

// =============================================================================
// Refresh claims
// =============================================================================

/// Claims embedded in a refresh token.
///
/// Only the identity: the role is re-read from the credential store at
/// rotation time, so a role change takes effect on the next refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject: the user id.
    pub sub: Uuid,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// JWT ID. Makes each minted token unique even within one second.
    pub jti: Uuid,
}

impl RefreshClaims {
    /// Creates claims for a user, expiring `expires_in_secs` from now.
    pub fn new(user_id: Uuid, expires_in_secs: i64) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: user_id,
            exp: now + expires_in_secs,
            iat: now,
            iss: None,
            jti: Uuid::now_v7(),
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

// =============================================================================
// Tests
// =============================================================================
