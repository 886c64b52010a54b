// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Health check handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::response::{ComponentStatus, HealthResponse, ReadinessResponse};
use crate::state::AppState;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Simple liveness check. Returns 200 OK if the service is running.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::healthy())
}

// =============================================================================
// Readiness Check
// =============================================================================

/// GET /ready
///
/// Readiness check that probes both stores with a cheap read.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let mut components = Vec::new();
    let mut all_healthy = true;

    match state.users().list().await {
        Ok(users) => components.push(ComponentStatus {
            name: "user_store".to_string(),
            healthy: true,
            message: Some(format!("{} users", users.len())),
        }),
        Err(err) => {
            all_healthy = false;
            components.push(ComponentStatus {
                name: "user_store".to_string(),
                healthy: false,
                message: Some(err.to_string()),
            });
        }
    }

    match state.projects().list().await {
        Ok(projects) => components.push(ComponentStatus {
            name: "project_store".to_string(),
            healthy: true,
            message: Some(format!("{} projects", projects.len())),
        }),
        Err(err) => {
            all_healthy = false;
            components.push(ComponentStatus {
                name: "project_store".to_string(),
                healthy: false,
                message: Some(err.to_string()),
            });
        }
    }

    let status = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready: all_healthy,
            components,
        }),
    )
}

// =============================================================================
// Tests
// =============================================================================
