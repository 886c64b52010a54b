// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Public user summary.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;

/// A user as exposed over the wire.
///
/// This is the only user shape that crosses the API boundary: password hashes
/// and refresh tokens stay inside the credential store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Stable user identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique email (natural key).
    pub email: String,
    /// Current role.
    pub role: Role,
}

impl UserSummary {
    /// Creates a new summary.
    pub fn new(id: Uuid, name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role,
        }
    }
}
