// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Wire shape of failure responses.
//!
//! Every error the API returns renders to this envelope, so the client SDK
//! can rebuild a typed error from any failed response.

use serde::{Deserialize, Serialize};

/// Top-level error envelope: `{"error": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// The error payload.
    pub error: ErrorDetails,
}

/// Machine-readable error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Stable SCREAMING_SNAKE error code (e.g. `INVALID_TOKEN`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Additional details (optional; validation failures carry field errors).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Creates an envelope from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetails {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Attaches detail payload.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }
}
