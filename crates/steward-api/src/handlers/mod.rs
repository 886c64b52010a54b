// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! This module contains the handler implementations for all API endpoints:
//!
//! - [`health`]: Health check endpoints
//! - [`auth`]: Authentication and session endpoints
//! - [`projects`]: Project lifecycle endpoints
//! - [`users`]: User directory endpoints

mod auth;
mod health;
mod projects;
mod users;

pub use auth::*;
pub use health::*;
pub use projects::*;
pub use users::*;
