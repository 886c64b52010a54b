// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware components.
//!
//! Two independent stages guard protected routes:
//! - [`AuthLayer`]: verifies the bearer access token and attaches the
//!   authentication context.
//! - [`RoleLayer`]: rejects verified identities whose role is not allowed
//!   through the gate.

mod auth;
mod role;

pub use auth::{AuthLayer, AuthMiddleware};
pub use role::{RoleLayer, RoleMiddleware};
