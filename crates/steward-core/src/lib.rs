// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # steward-core
//!
//! Shared domain types for the Steward project service.
//!
//! This crate defines the vocabulary common to the API server and the client
//! SDK:
//!
//! - **Role**: the three-role authorization model (`ADMIN`, `LEAD`, `DEVELOPER`)
//! - **Auth**: login/refresh/registration request and response bodies, and the
//!   access/refresh token pair
//! - **Project**: project lifecycle types and request/response bodies
//! - **User**: the public user summary (never carries password hashes or
//!   refresh tokens)
//! - **Error body**: the wire shape every failure response renders to
//!
//! All request/response types serialize with camelCase field names to match
//! the HTTP surface.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod error;
pub mod project;
pub mod role;
pub mod user;

pub use auth::{
    EditRoleRequest, LoginRequest, LoginResponse, MessageResponse, RefreshRequest,
    RefreshResponse, RegisterRequest, SessionCheckResponse, TokenPair,
};
pub use error::{ErrorBody, ErrorDetails};
pub use project::{
    AssignDeveloperRequest, CreateProjectRequest, Project, ProjectStatus, UpdateProjectRequest,
};
pub use role::{Role, RoleParseError};
pub use user::UserSummary;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
