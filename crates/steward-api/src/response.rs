// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Probe response types.
//!
//! Domain responses live in `steward-core`; these shapes back the liveness
//! and readiness endpoints only.

use serde::{Deserialize, Serialize};

// =============================================================================
// Health
// =============================================================================

/// Liveness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

// =============================================================================
// Readiness
// =============================================================================

/// Readiness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service is ready.
    pub ready: bool,
    /// Component statuses.
    pub components: Vec<ComponentStatus>,
}

/// Status of a backing component.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentStatus {
    /// Component name.
    pub name: String,
    /// Whether the component is healthy.
    pub healthy: bool,
    /// Optional message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_carries_version() {
        let response = HealthResponse::healthy();
        assert_eq!(response.status, "ok");
        assert_eq!(response.version, crate::VERSION);
    }

    #[test]
    fn test_component_status_omits_empty_message() {
        let status = ComponentStatus {
            name: "user_store".to_string(),
            healthy: true,
            message: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert!(json.get("message").is_none());
    }
}
