// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # steward-bin
//!
//! CLI binary for the Steward project-management service.
//!
//! This crate provides the main binary entry point for Steward, including:
//!
//! - CLI argument parsing with clap
//! - Service runtime orchestration
//! - Graceful shutdown handling
//! - Logging initialization
//! - Command implementations (run, validate, version)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         main.rs                              │
//! │                    (Entry Point)                             │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                    ┌──────▼──────┐
//!                    │    cli.rs   │
//!                    │ (Argument   │
//!                    │  Parsing)   │
//!                    └──────┬──────┘
//!                           │
//!               ┌───────────┼───────────┐
//!               ▼           ▼           ▼
//!        ┌──────────┐ ┌──────────┐ ┌──────────┐
//!        │ commands │ │ runtime  │ │ logging  │
//!        │          │ │          │ │          │
//!        └──────────┘ └──────────┘ └──────────┘
//!               │           │
//!               │    ┌──────▼──────┐
//!               │    │  shutdown   │
//!               │    │ (Graceful)  │
//!               │    └─────────────┘
//!               │
//!        ┌──────┴──────┐
//!        │  steward-*  │
//!        │  (crates)   │
//!        └─────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the server (default command)
//! steward
//!
//! # Start with custom config
//! steward -c /etc/steward/config.yaml
//!
//! # Override the bind address
//! steward run --host 127.0.0.1 --port 9090
//!
//! # Validate configuration
//! steward validate
//!
//! # Show version
//! steward version
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{RuntimeBuilder, ServiceRuntime};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
