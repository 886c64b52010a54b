// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Pre-built test data for the integration suites.
//!
//! Each test spawns its own server with its own stores, so fixed emails
//! never collide across tests.

use chrono::{TimeZone, Utc};
use steward_core::{CreateProjectRequest, Role};

// =============================================================================
// Accounts
// =============================================================================

/// A test account's credentials, as seeded and as used to log in.
#[derive(Debug, Clone)]
pub struct TestAccount {
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Seeded role.
    pub role: Role,
}

impl TestAccount {
    /// The standing administrator account.
    pub fn admin() -> Self {
        Self {
            name: "Ada Admin".to_string(),
            email: "ada@steward.test".to_string(),
            password: "admin-password-1".to_string(),
            role: Role::Admin,
        }
    }

    /// A project lead.
    pub fn lead() -> Self {
        Self {
            name: "Lena Lead".to_string(),
            email: "lena@steward.test".to_string(),
            password: "lead-password-1".to_string(),
            role: Role::Lead,
        }
    }

    /// A second, unrelated project lead.
    pub fn other_lead() -> Self {
        Self {
            name: "Lars Lead".to_string(),
            email: "lars@steward.test".to_string(),
            password: "lead-password-2".to_string(),
            role: Role::Lead,
        }
    }

    /// A developer.
    pub fn developer() -> Self {
        Self {
            name: "Devon Developer".to_string(),
            email: "devon@steward.test".to_string(),
            password: "developer-password-1".to_string(),
            role: Role::Developer,
        }
    }

    /// A second developer, never assigned to anything by default.
    pub fn other_developer() -> Self {
        Self {
            name: "Dana Developer".to_string(),
            email: "dana@steward.test".to_string(),
            password: "developer-password-2".to_string(),
            role: Role::Developer,
        }
    }

    /// Returns a copy of this account with a different email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }
}

// =============================================================================
// Projects
// =============================================================================

/// Pre-built project payloads.
pub struct ProjectFixtures;

impl ProjectFixtures {
    /// A creation request with no deadline, led by the given email.
    pub fn create_request(lead_email: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            name: "Apollo Migration".to_string(),
            description: "Move the billing pipeline to the new queue".to_string(),
            deadline: None,
            lead_email: lead_email.to_string(),
        }
    }

    /// A creation request with a fixed, whole-second deadline.
    pub fn create_request_with_deadline(lead_email: &str) -> CreateProjectRequest {
        let deadline = Utc
            .with_ymd_and_hms(2026, 1, 15, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp");

        CreateProjectRequest {
            deadline: Some(deadline),
            ..Self::create_request(lead_email)
        }
    }

    /// A second creation request, distinguishable from the first by name.
    pub fn other_create_request(lead_email: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            name: "Borealis Rollout".to_string(),
            description: "Stage the new dashboard behind a flag".to_string(),
            deadline: None,
            lead_email: lead_email.to_string(),
        }
    }
}
