// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Credential and project stores.
//!
//! Handlers talk to storage through the [`UserStore`] and [`ProjectStore`]
//! traits so persistence remains an external collaborator; the in-memory
//! implementations back the default deployment and every test.
//!
//! The stored user shape ([`UserRecord`]) is the only place password hashes
//! and refresh tokens live. It never crosses the API boundary: callers
//! convert to [`UserSummary`] before serializing.

mod memory;

pub use memory::{InMemoryProjectStore, InMemoryUserStore};

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use steward_core::{ProjectStatus, Role, UserSummary};
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// StoreError
// =============================================================================

/// Errors produced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The email natural key is already taken.
    #[error("Email already registered: {email}")]
    DuplicateEmail {
        /// The conflicting email.
        email: String,
    },

    /// The backing storage failed.
    #[error("Store backend failure: {message}")]
    Backend {
        /// Failure detail.
        message: String,
    },
}

impl StoreError {
    /// Creates a duplicate email error.
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }

    /// Creates a backend failure error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

// =============================================================================
// UserRecord
// =============================================================================

/// A user as held in the credential store.
///
/// Carries the argon2 password hash and the single outstanding refresh
/// token. A user has zero or one valid refresh token at any time; every
/// mutation overwrites, never appends.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Stable identifier, used as the JWT subject.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique email (natural key).
    pub email: String,
    /// Argon2id PHC-format password hash.
    pub password_hash: String,
    /// Current role.
    pub role: Role,
    /// The refresh token accepted for this user's next rotation, if any.
    pub refresh_token: Option<String>,
}

impl UserRecord {
    /// Creates a new record with a fresh v7 id and no session.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            refresh_token: None,
        }
    }

    /// Returns the public shape of this record.
    pub fn summary(&self) -> UserSummary {
        UserSummary::new(self.id, self.name.clone(), self.email.clone(), self.role)
    }
}

// =============================================================================
// ProjectRecord
// =============================================================================

/// A project as held in the project store.
///
/// Members are stored by id; the wire shape embeds their summaries, joined
/// against the credential store at response time.
#[derive(Debug, Clone)]
pub struct ProjectRecord {
    /// Stable identifier.
    pub id: Uuid,
    /// Project name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Optional delivery deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: ProjectStatus,
    /// The single lead responsible for the project.
    pub lead_id: Uuid,
    /// Developers assigned by the lead, in assignment order.
    pub developer_ids: Vec<Uuid>,
}

impl ProjectRecord {
    /// Creates a new active project with a fresh v7 id and no developers.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        deadline: Option<DateTime<Utc>>,
        lead_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            description: description.into(),
            deadline,
            status: ProjectStatus::Active,
            lead_id,
            developer_ids: Vec::new(),
        }
    }

    /// Returns `true` once the project is marked completed.
    pub fn is_completed(&self) -> bool {
        self.status == ProjectStatus::Completed
    }

    /// Returns `true` if the user leads this project.
    pub fn is_led_by(&self, user_id: Uuid) -> bool {
        self.lead_id == user_id
    }

    /// Returns `true` if the user is assigned as a developer.
    pub fn has_developer(&self, user_id: Uuid) -> bool {
        self.developer_ids.contains(&user_id)
    }
}

/// Field changes applied by a project update.
///
/// Absent fields keep their current values, mirroring the wire contract.
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    /// New name, if changing.
    pub name: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New deadline, if changing.
    pub deadline: Option<DateTime<Utc>>,
}

// =============================================================================
// Rotation outcome
// =============================================================================

/// Outcome of the refresh rotation compare-and-swap.
///
/// The swap is evaluated under the store's per-entry lock: of two racing
/// rotations with the same presented token, exactly one observes `Updated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The stored token matched the presented one and was replaced.
    Updated,
    /// No user with that id exists.
    Missing,
    /// The stored token differs from the presented one (or is absent).
    Mismatch,
}

// =============================================================================
// UserStore
// =============================================================================

/// Credential store interface.
#[async_trait]
pub trait UserStore: Send + Sync + Debug {
    /// Inserts a new user.
    ///
    /// Fails with [`StoreError::DuplicateEmail`] if the email is taken.
    async fn insert(&self, record: UserRecord) -> StoreResult<UserSummary>;

    /// Looks up a user by id.
    async fn get(&self, id: Uuid) -> StoreResult<Option<UserRecord>>;

    /// Looks up a user by email.
    async fn get_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    /// Lists all users as public summaries.
    async fn list(&self) -> StoreResult<Vec<UserSummary>>;

    /// Changes a user's role, keyed by email.
    ///
    /// Returns the updated summary, or `None` if no such user exists. The
    /// new role takes effect on tokens minted afterwards; outstanding access
    /// tokens keep their embedded role until they expire.
    async fn update_role(&self, email: &str, role: Role) -> StoreResult<Option<UserSummary>>;

    /// Overwrites the stored refresh token (login path).
    ///
    /// Returns `false` if no such user exists.
    async fn set_refresh_token(&self, id: Uuid, token: &str) -> StoreResult<bool>;

    /// Clears the stored refresh token (logout path).
    ///
    /// Returns `false` if no such user exists.
    async fn clear_refresh_token(&self, id: Uuid) -> StoreResult<bool>;

    /// Replaces the stored refresh token only if it still equals `presented`.
    ///
    /// This is the rotation step: match and overwrite happen as one atomic
    /// operation, so a refresh token is usable for exactly one successful
    /// rotation.
    async fn swap_refresh_token(
        &self,
        id: Uuid,
        presented: &str,
        replacement: &str,
    ) -> StoreResult<SwapOutcome>;
}

// =============================================================================
// ProjectStore
// =============================================================================

/// Project store interface.
///
/// Authorization guards (role, lead identity, completed status) live in the
/// handlers; the store holds plain state transitions.
#[async_trait]
pub trait ProjectStore: Send + Sync + Debug {
    /// Inserts a new project.
    async fn insert(&self, record: ProjectRecord) -> StoreResult<()>;

    /// Looks up a project by id.
    async fn get(&self, id: Uuid) -> StoreResult<Option<ProjectRecord>>;

    /// Lists all projects in creation order.
    async fn list(&self) -> StoreResult<Vec<ProjectRecord>>;

    /// Merges field changes into a project.
    ///
    /// Returns the updated record, or `None` if no such project exists.
    async fn update_details(
        &self,
        id: Uuid,
        changes: ProjectChanges,
    ) -> StoreResult<Option<ProjectRecord>>;

    /// Sets a project's lifecycle status.
    ///
    /// Returns `false` if no such project exists. Setting the current status
    /// again is a no-op.
    async fn set_status(&self, id: Uuid, status: ProjectStatus) -> StoreResult<bool>;

    /// Removes a project.
    ///
    /// Returns `false` if no such project exists.
    async fn remove(&self, id: Uuid) -> StoreResult<bool>;

    /// Adds a developer to a project's assignment set.
    ///
    /// Assigning an already-assigned developer is a no-op. Returns `false`
    /// if no such project exists.
    async fn add_developer(&self, id: Uuid, developer_id: Uuid) -> StoreResult<bool>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_record_summary_drops_credentials() {
        let record = UserRecord::new("Ada", "ada@example.com", "$argon2id$stub", Role::Admin);
        let summary = record.summary();

        assert_eq!(summary.id, record.id);
        assert_eq!(summary.email, "ada@example.com");
        assert_eq!(summary.role, Role::Admin);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("refreshToken").is_none());
    }

    #[test]
    fn test_new_user_record_has_no_session() {
        let record = UserRecord::new("Ada", "ada@example.com", "hash", Role::Developer);
        assert!(record.refresh_token.is_none());
    }

    #[test]
    fn test_new_project_record_is_active_and_empty() {
        let lead = Uuid::now_v7();
        let record = ProjectRecord::new("Apollo", "Launch tooling", None, lead);

        assert_eq!(record.status, ProjectStatus::Active);
        assert!(!record.is_completed());
        assert!(record.is_led_by(lead));
        assert!(record.developer_ids.is_empty());
        assert!(!record.has_developer(Uuid::now_v7()));
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::duplicate_email("dup@example.com");
        assert!(err.to_string().contains("dup@example.com"));

        let err = StoreError::backend("unreachable");
        assert!(err.to_string().contains("unreachable"));
    }
}
