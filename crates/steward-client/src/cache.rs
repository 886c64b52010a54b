// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Durable token cache.
//!
//! The cache is the single stamping source for outgoing requests: one
//! session file holding the current access/refresh pair, mirrored in memory
//! behind a lock. Reads at dispatch time go through [`TokenCache::get`], so
//! a rotation is honored on the very next request.

use std::path::PathBuf;

use parking_lot::RwLock;
use steward_core::TokenPair;
use tracing::warn;

use crate::error::ClientResult;

// =============================================================================
// TokenCache
// =============================================================================

/// Client-side storage for the current token pair.
///
/// With a session file the pair survives process restarts; without one the
/// cache is process-local. Mutations write the file first and commit the
/// in-memory mirror only after the write lands.
#[derive(Debug)]
pub struct TokenCache {
    /// Path to the session JSON file (None = in-memory only).
    path: Option<PathBuf>,
    current: RwLock<TokenPair>,
}

impl TokenCache {
    /// Creates a process-local cache with no durable file.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            current: RwLock::new(TokenPair::empty()),
        }
    }

    /// Creates a cache backed by a session file.
    ///
    /// An existing file seeds the in-memory pair; a missing or unreadable
    /// file starts the session logged out.
    pub fn with_persistence(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = load_session_file(&path).unwrap_or_default();
        Self {
            path: Some(path),
            current: RwLock::new(current),
        }
    }

    /// Merges the supplied tokens into the stored pair.
    ///
    /// Tokens absent from `pair` keep their current values, so an
    /// access-only update does not drop the refresh token.
    pub fn set(&self, pair: &TokenPair) -> ClientResult<()> {
        let mut current = self.current.write();

        let mut merged = current.clone();
        if let Some(access) = &pair.access_token {
            merged.access_token = Some(access.clone());
        }
        if let Some(refresh) = &pair.refresh_token {
            merged.refresh_token = Some(refresh.clone());
        }

        self.persist(&merged)?;
        *current = merged;
        Ok(())
    }

    /// Removes both tokens and deletes the session file.
    ///
    /// The in-memory pair is cleared before the file is touched: once a
    /// session ends, no request may be stamped with the stale access token.
    pub fn clear(&self) -> ClientResult<()> {
        let mut current = self.current.write();
        *current = TokenPair::empty();

        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Reads the current pair.
    ///
    /// With a session file this re-reads the file, so external changes
    /// (another process rotating, or a deleted file) are picked up. A file
    /// that fails to read falls back to the in-memory mirror.
    pub fn get(&self) -> TokenPair {
        let Some(path) = &self.path else {
            return self.current.read().clone();
        };

        match std::fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str::<TokenPair>(&data) {
                Ok(pair) => {
                    *self.current.write() = pair.clone();
                    pair
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Session file is corrupt");
                    self.current.read().clone()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let mut current = self.current.write();
                *current = TokenPair::empty();
                TokenPair::empty()
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Session file is unreadable");
                self.current.read().clone()
            }
        }
    }

    /// Returns the access token to stamp on the next request.
    pub fn access_token(&self) -> Option<String> {
        self.get().access_token
    }

    /// Returns the current refresh token.
    pub fn refresh_token(&self) -> Option<String> {
        self.get().refresh_token
    }

    /// Atomically writes the session file (write tmp + rename).
    fn persist(&self, pair: &TokenPair) -> ClientResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(pair)?;
        std::fs::write(&tmp_path, &data)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600));
        }
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

/// Loads and parses a session file, treating any failure as "no session".
fn load_session_file(path: &PathBuf) -> Option<TokenPair> {
    let data = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

// =============================================================================
// Tests
// =============================================================================
