// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # steward-api
//!
//! REST API server for the Steward project-management service.
//!
//! This crate provides the HTTP API server with JWT authentication,
//! role-gated routes, and rotating refresh-token sessions.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod response;
pub mod server;
pub mod state;
pub mod store;

pub use config::{ApiConfig, BootstrapAdmin, CorsConfig};
pub use error::{ApiError, ApiResult};
pub use server::{ApiServer, ApiServerBuilder};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
