// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # steward-client
//!
//! Client SDK for the Steward project service.
//!
//! Provides a typed API client with durable token storage and transparent
//! session refresh: on an expired access token, concurrent failing requests
//! share a single refresh round trip and each retries exactly once.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cache;
pub mod client;
pub mod error;
pub mod session;

pub use cache::TokenCache;
pub use client::{ApiClient, ApiClientBuilder};
pub use error::{ClientError, ClientResult};
pub use session::{Refresher, Session};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
