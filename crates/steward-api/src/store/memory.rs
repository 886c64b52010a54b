// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory store implementations backed by [`DashMap`].
//!
//! The refresh rotation compare-and-swap relies on `DashMap`'s per-entry
//! locking: the stored-token comparison and the overwrite happen while the
//! entry guard is held, so concurrent rotations with the same presented
//! token serialize and exactly one wins.

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use steward_core::{ProjectStatus, Role, UserSummary};
use uuid::Uuid;

use super::{
    ProjectChanges, ProjectRecord, ProjectStore, StoreError, StoreResult, SwapOutcome, UserRecord,
    UserStore,
};

// =============================================================================
// InMemoryUserStore
// =============================================================================

/// DashMap-backed credential store.
///
/// Email uniqueness is enforced through a secondary index claimed before the
/// record is visible, so two concurrent registrations of the same email
/// cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: DashMap<Uuid, UserRecord>,
    email_index: DashMap<String, Uuid>,
}

impl InMemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns `true` if no users are stored.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, record: UserRecord) -> StoreResult<UserSummary> {
        match self.email_index.entry(record.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::duplicate_email(&record.email)),
            Entry::Vacant(slot) => {
                let summary = record.summary();
                self.users.insert(record.id, record);
                slot.insert(summary.id);
                Ok(summary)
            }
        }
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.get(&id).map(|entry| entry.clone()))
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let id = match self.email_index.get(email) {
            Some(entry) => *entry,
            None => return Ok(None),
        };
        Ok(self.users.get(&id).map(|entry| entry.clone()))
    }

    async fn list(&self) -> StoreResult<Vec<UserSummary>> {
        let mut users: Vec<UserSummary> =
            self.users.iter().map(|entry| entry.summary()).collect();
        // v7 ids sort by creation time
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    async fn update_role(&self, email: &str, role: Role) -> StoreResult<Option<UserSummary>> {
        let id = match self.email_index.get(email) {
            Some(entry) => *entry,
            None => return Ok(None),
        };
        let mut entry = match self.users.get_mut(&id) {
            Some(entry) => entry,
            None => return Ok(None),
        };
        entry.role = role;
        Ok(Some(entry.summary()))
    }

    async fn set_refresh_token(&self, id: Uuid, token: &str) -> StoreResult<bool> {
        match self.users.get_mut(&id) {
            Some(mut entry) => {
                entry.refresh_token = Some(token.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_refresh_token(&self, id: Uuid) -> StoreResult<bool> {
        match self.users.get_mut(&id) {
            Some(mut entry) => {
                entry.refresh_token = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn swap_refresh_token(
        &self,
        id: Uuid,
        presented: &str,
        replacement: &str,
    ) -> StoreResult<SwapOutcome> {
        let mut entry = match self.users.get_mut(&id) {
            Some(entry) => entry,
            None => return Ok(SwapOutcome::Missing),
        };

        // Compare and overwrite under the entry guard
        match entry.refresh_token.as_deref() {
            Some(stored) if stored == presented => {
                entry.refresh_token = Some(replacement.to_string());
                Ok(SwapOutcome::Updated)
            }
            _ => Ok(SwapOutcome::Mismatch),
        }
    }
}

// =============================================================================
// InMemoryProjectStore
// =============================================================================

/// DashMap-backed project store.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    projects: DashMap<Uuid, ProjectRecord>,
}

impl InMemoryProjectStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored projects.
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// Returns `true` if no projects are stored.
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn insert(&self, record: ProjectRecord) -> StoreResult<()> {
        self.projects.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<ProjectRecord>> {
        Ok(self.projects.get(&id).map(|entry| entry.clone()))
    }

    async fn list(&self) -> StoreResult<Vec<ProjectRecord>> {
        let mut projects: Vec<ProjectRecord> =
            self.projects.iter().map(|entry| entry.clone()).collect();
        // v7 ids sort by creation time
        projects.sort_by_key(|project| project.id);
        Ok(projects)
    }

    async fn update_details(
        &self,
        id: Uuid,
        changes: ProjectChanges,
    ) -> StoreResult<Option<ProjectRecord>> {
        let mut entry = match self.projects.get_mut(&id) {
            Some(entry) => entry,
            None => return Ok(None),
        };

        if let Some(name) = changes.name {
            entry.name = name;
        }
        if let Some(description) = changes.description {
            entry.description = description;
        }
        if let Some(deadline) = changes.deadline {
            entry.deadline = Some(deadline);
        }

        Ok(Some(entry.clone()))
    }

    async fn set_status(&self, id: Uuid, status: ProjectStatus) -> StoreResult<bool> {
        match self.projects.get_mut(&id) {
            Some(mut entry) => {
                entry.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.projects.remove(&id).is_some())
    }

    async fn add_developer(&self, id: Uuid, developer_id: Uuid) -> StoreResult<bool> {
        match self.projects.get_mut(&id) {
            Some(mut entry) => {
                if !entry.developer_ids.contains(&developer_id) {
                    entry.developer_ids.push(developer_id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
