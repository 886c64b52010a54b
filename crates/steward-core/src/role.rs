// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The three-role authorization model.

use serde::{Deserialize, Serialize};

// =============================================================================
// Role
// =============================================================================

/// A user's role.
///
/// Every user holds exactly one role. Roles are flat (no inheritance):
/// endpoint access is granted by listing the roles allowed through the gate.
///
/// # Examples
///
/// ```
/// use steward_core::Role;
///
/// let role = Role::parse("ADMIN").unwrap();
/// assert_eq!(role, Role::Admin);
/// assert_eq!(role.as_str(), "ADMIN");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Creates users and projects, edits roles, sees everything.
    Admin,
    /// Leads projects and assigns developers to them.
    Lead,
    /// Works on assigned projects.
    Developer,
}

impl Role {
    /// Returns the role name in its wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Lead => "LEAD",
            Role::Developer => "DEVELOPER",
        }
    }

    /// Parses a role from its wire form (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, RoleParseError> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "LEAD" => Ok(Role::Lead),
            "DEVELOPER" => Ok(Role::Developer),
            _ => Err(RoleParseError {
                value: s.to_string(),
            }),
        }
    }

    /// Returns all roles.
    pub fn all() -> [Role; 3] {
        [Role::Admin, Role::Lead, Role::Developer]
    }

    /// Returns `true` for the administrator role.
    #[inline]
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Developer
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s)
    }
}

/// Error returned when a string does not name a role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {value}")]
pub struct RoleParseError {
    /// The rejected input.
    pub value: String,
}
