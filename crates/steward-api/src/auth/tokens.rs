// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token issuing and verification.
//!
//! Access and refresh tokens are signed with independent secrets and
//! independent lifetimes. Verification of a refresh token deliberately
//! collapses every failure into one rejection so callers cannot distinguish
//! a bad signature from an expired token.

use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use steward_core::Role;
use uuid::Uuid;

use super::{AccessClaims, RefreshClaims};
use crate::error::{ApiError, ApiResult};

/// Signing algorithm for both token classes.
const ALGORITHM: Algorithm = Algorithm::HS256;

// =============================================================================
// TokenConfig
// =============================================================================

/// Token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Secret for signing access tokens.
    #[serde(skip_serializing)]
    pub access_secret: String,
    /// Secret for signing refresh tokens. Must differ from the access secret.
    #[serde(skip_serializing)]
    pub refresh_secret: String,
    /// Token issuer.
    pub issuer: String,
    /// Access token lifetime in seconds.
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_ttl_secs: i64,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),  // Must be set by user
            refresh_secret: String::new(), // Must be set by user
            issuer: "steward".to_string(),
            access_ttl_secs: 900,            // 15 minutes
            refresh_ttl_secs: 86400 * 7,     // 7 days
            leeway_secs: 60,
        }
    }
}

impl TokenConfig {
    /// Creates a new configuration with the given secrets.
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the access token lifetime.
    pub fn with_access_ttl(mut self, secs: i64) -> Self {
        self.access_ttl_secs = secs;
        self
    }

    /// Sets the refresh token lifetime.
    pub fn with_refresh_ttl(mut self, secs: i64) -> Self {
        self.refresh_ttl_secs = secs;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        if self.access_secret.is_empty() {
            return Err(ApiError::internal("Access token secret is not configured"));
        }
        if self.refresh_secret.is_empty() {
            return Err(ApiError::internal("Refresh token secret is not configured"));
        }
        if self.access_secret == self.refresh_secret {
            return Err(ApiError::internal(
                "Access and refresh token secrets must differ",
            ));
        }
        if self.access_secret.len() < 32 || self.refresh_secret.len() < 32 {
            tracing::warn!("Token secret is shorter than recommended (32 bytes)");
        }
        Ok(())
    }
}

// =============================================================================
// TokenIssuer
// =============================================================================

/// Mints and verifies both token classes.
///
/// The central component for session credentials. Minting has no side
/// effects; persisting a refresh token is the caller's responsibility.
#[derive(Clone)]
pub struct TokenIssuer {
    config: Arc<TokenConfig>,
    access_encoding: Arc<EncodingKey>,
    access_decoding: Arc<DecodingKey>,
    refresh_encoding: Arc<EncodingKey>,
    refresh_decoding: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl TokenIssuer {
    /// Creates a new issuer with the given configuration.
    pub fn new(config: TokenConfig) -> ApiResult<Self> {
        config.validate()?;

        let access_encoding = EncodingKey::from_secret(config.access_secret.as_bytes());
        let access_decoding = DecodingKey::from_secret(config.access_secret.as_bytes());
        let refresh_encoding = EncodingKey::from_secret(config.refresh_secret.as_bytes());
        let refresh_decoding = DecodingKey::from_secret(config.refresh_secret.as_bytes());

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[&config.issuer]);
        validation.leeway = config.leeway_secs;
        validation.validate_aud = false;

        Ok(Self {
            config: Arc::new(config),
            access_encoding: Arc::new(access_encoding),
            access_decoding: Arc::new(access_decoding),
            refresh_encoding: Arc::new(refresh_encoding),
            refresh_decoding: Arc::new(refresh_decoding),
            validation: Arc::new(validation),
        })
    }

    /// Mints an access token for a user.
    pub fn issue_access(&self, user_id: Uuid, email: &str, role: Role) -> ApiResult<String> {
        let claims = AccessClaims::new(user_id, email, role, self.config.access_ttl_secs)
            .with_issuer(&self.config.issuer);

        encode(&Header::new(ALGORITHM), &claims, &self.access_encoding)
            .map_err(|e| ApiError::internal(format!("Failed to create access token: {}", e)))
    }

    /// Mints a refresh token for a user.
    pub fn issue_refresh(&self, user_id: Uuid) -> ApiResult<String> {
        let claims = RefreshClaims::new(user_id, self.config.refresh_ttl_secs)
            .with_issuer(&self.config.issuer);

        encode(&Header::new(ALGORITHM), &claims, &self.refresh_encoding)
            .map_err(|e| ApiError::internal(format!("Failed to create refresh token: {}", e)))
    }

    /// Verifies an access token and returns its claims.
    pub fn verify_access(&self, token: &str) -> ApiResult<AccessClaims> {
        decode::<AccessClaims>(token, &self.access_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ApiError::unauthenticated("Access token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    ApiError::unauthenticated("Invalid access token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    ApiError::unauthenticated("Invalid access token issuer")
                }
                _ => ApiError::unauthenticated("Invalid access token"),
            })
    }

    /// Verifies a refresh token and returns its claims.
    ///
    /// Every failure maps to the same rejection: callers must not learn
    /// whether the signature, the expiry, or the format was at fault.
    pub fn verify_refresh(&self, token: &str) -> ApiResult<RefreshClaims> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Refresh token failed verification");
                ApiError::invalid_token("Invalid refresh token")
            })
    }

    /// Returns the access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.config.access_ttl_secs
    }

    /// Returns the refresh token lifetime in seconds.
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.config.refresh_ttl_secs
    }

    #[cfg(test)]
    fn encode_access_claims(&self, claims: &AccessClaims) -> String {
        encode(&Header::new(ALGORITHM), claims, &self.access_encoding).unwrap()
    }

    #[cfg(test)]
    fn encode_refresh_claims(&self, claims: &RefreshClaims) -> String {
        encode(&Header::new(ALGORITHM), claims, &self.refresh_encoding).unwrap()
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.config.issuer)
            .field("access_ttl_secs", &self.config.access_ttl_secs)
            .field("refresh_ttl_secs", &self.config.refresh_ttl_secs)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
