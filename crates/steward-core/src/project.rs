// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Project lifecycle types and request/response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserSummary;

// =============================================================================
// Status
// =============================================================================

/// Project lifecycle status.
///
/// Completed projects are read-only: updates and developer assignment are
/// rejected once a project is marked completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProjectStatus {
    /// Open for updates and assignment.
    #[default]
    Active,
    /// Closed; mutations are rejected.
    Completed,
}

impl ProjectStatus {
    /// Returns the status in its wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Project
// =============================================================================

/// A project as exposed over the wire.
///
/// Lead and developers are embedded as public summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Stable project identifier.
    pub id: Uuid,
    /// Project name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Optional delivery deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// The single lead responsible for the project.
    pub lead: UserSummary,
    /// Developers assigned by the lead.
    pub developers: Vec<UserSummary>,
}

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /projects` (administrator only).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Optional delivery deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    /// Email of the user who will lead the project.
    pub lead_email: String,
}

/// Body of `PATCH /projects/{id}/update` (administrator only).
///
/// Absent fields keep their current values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    /// New name, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New deadline, if changing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
}

/// Body of `PATCH /projects/{id}/assign` (lead only).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDeveloperRequest {
    /// Email of the developer to assign.
    pub developer_email: String,
}
