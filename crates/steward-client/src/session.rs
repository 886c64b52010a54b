// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Single-flight refresh coordination.
//!
//! After the access token expires, every in-flight request fails in a tight
//! window, and each would race to redeem the single server-side refresh
//! token; all but the first would lose the rotation. [`Session`] collapses
//! them into one refresh call: a fair async mutex serializes refreshers,
//! and an epoch counter on the cached pair lets every waiter detect that a
//! predecessor already rotated and reuse its result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use steward_core::RefreshResponse;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::TokenCache;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Refresher
// =============================================================================

/// The network half of a refresh: redeems a refresh token for a new pair.
///
/// Split from [`Session`] so the coordination logic is testable without a
/// server.
#[async_trait]
pub trait Refresher: Send + Sync {
    /// Calls the refresh endpoint with the given token.
    async fn refresh(&self, refresh_token: &str) -> ClientResult<RefreshResponse>;
}

// =============================================================================
// Session
// =============================================================================

/// Client session state: the token cache plus the single-flight guard.
#[derive(Debug)]
pub struct Session {
    cache: Arc<TokenCache>,
    // tokio's Mutex is fair, so waiters wake FIFO
    guard: Mutex<()>,
    epoch: AtomicU64,
}

impl Session {
    /// Creates a session over the given cache.
    pub fn new(cache: Arc<TokenCache>) -> Self {
        Self {
            cache,
            guard: Mutex::new(()),
            epoch: AtomicU64::new(0),
        }
    }

    /// Returns the backing token cache.
    pub fn cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }

    /// Returns the current pair generation.
    ///
    /// Sampled at request dispatch; a later mismatch means the pair was
    /// rotated (or cleared) after that request was stamped.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Redeems the stored refresh token for a new pair, single-flight.
    ///
    /// `observed_epoch` is the generation the failing request was stamped
    /// under. If the pair has moved past it by the time the guard is
    /// acquired, some other task already refreshed: the rotated access token
    /// is returned without a second network call, or [`ClientError::NoSession`]
    /// if that refresh failed and ended the session.
    ///
    /// On a refresh failure the session is cleared before the error
    /// propagates, so no request can be stamped with the dead pair.
    pub async fn refresh(
        &self,
        refresher: &dyn Refresher,
        observed_epoch: u64,
    ) -> ClientResult<String> {
        let _guard = self.guard.lock().await;

        if self.epoch.load(Ordering::Acquire) != observed_epoch {
            debug!("Reusing token pair rotated by a concurrent refresh");
            return match self.cache.get().access_token {
                Some(access) => Ok(access),
                None => Err(ClientError::NoSession),
            };
        }

        let refresh_token = match self.cache.get().refresh_token {
            Some(token) => token,
            None => {
                self.clear()?;
                return Err(ClientError::NoSession);
            }
        };

        match refresher.refresh(&refresh_token).await {
            Ok(pair) => {
                debug!("Refresh succeeded, pair rotated");
                let access = pair.access_token.clone();
                self.cache.set(&pair.into_pair())?;
                self.epoch.fetch_add(1, Ordering::AcqRel);
                Ok(access)
            }
            Err(err) => {
                debug!(error = %err, "Refresh failed, ending session");
                self.clear()?;
                Err(err)
            }
        }
    }

    /// Ends the session: clears the cache and advances the generation.
    pub fn clear(&self) -> ClientResult<()> {
        self.cache.clear()?;
        self.epoch.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
