// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication module.
//!
//! This module provides:
//! - Access and refresh token claims
//! - Token issuing and verification with independent per-class secrets
//! - The authentication context attached to verified requests

mod claims;
mod context;
mod tokens;

pub use claims::{AccessClaims, RefreshClaims};
pub use context::AuthContext;
pub use tokens::{TokenConfig, TokenIssuer};
