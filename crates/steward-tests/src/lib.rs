// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Steward Integration Tests
//!
//! This crate provides end-to-end integration tests for the Steward
//! project-management service. Every suite spawns a real server on an
//! ephemeral port and talks to it over HTTP, either through the client SDK
//! or through raw requests when the wire shape itself is under test.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Pre-built accounts and project payloads
//!   - `harness`: The spawn-a-real-server test harness
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p steward-tests
//!
//! # Run specific test suite
//! cargo test -p steward-tests --test integration_server
//! cargo test -p steward-tests --test integration_auth
//! cargo test -p steward-tests --test integration_client
//! cargo test -p steward-tests --test integration_projects
//!
//! # Run with verbose output
//! cargo test -p steward-tests -- --nocapture
//! ```
//!
//! ## Test Categories
//!
//! ### Server Tests (`integration_server.rs`)
//! - Liveness and readiness probes
//! - Middleware ordering (authentication before routing)
//! - Malformed request handling
//! - CORS preflight
//! - Graceful shutdown
//!
//! ### Auth Tests (`integration_auth.rs`)
//! - Login and credential verification
//! - Refresh rotation and replay rejection
//! - Logout and session invalidation
//! - Registration and role editing behind the ADMIN gate
//!
//! ### Client Tests (`integration_client.rs`)
//! - Transparent retry after access-token expiry
//! - Single-flight refresh under concurrency
//! - Failed-refresh session teardown
//! - Durable session files across client restarts
//!
//! ### Project Tests (`integration_projects.rs`)
//! - Full project lifecycle (create, assign, complete, delete)
//! - Role-scoped listings
//! - Lead-ownership and completed-project guards

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;
