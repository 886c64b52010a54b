// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Graceful shutdown coordination.
//!
//! This module provides utilities for coordinating graceful shutdown of the
//! API server. It handles OS signals (SIGTERM, SIGINT, SIGQUIT) and allows
//! components to subscribe to shutdown notifications.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

// =============================================================================
// ShutdownCoordinator
// =============================================================================

/// Coordinates graceful shutdown across server components.
///
/// The coordinator provides:
/// - A broadcast channel for notifying all components of shutdown
/// - Signal handling for SIGTERM/SIGINT/SIGQUIT (Unix) or Ctrl+C (Windows)
/// - A future that resolves when shutdown is initiated
///
/// # Example
///
/// ```ignore
/// use steward_bin::shutdown::ShutdownCoordinator;
///
/// let coordinator = ShutdownCoordinator::new();
///
/// // Hand the server a future that resolves on shutdown
/// let signal = coordinator.shutdown_signal();
///
/// // In another task, wait for an OS signal
/// coordinator.wait_for_shutdown().await;
/// ```
#[derive(Clone)]
pub struct ShutdownCoordinator {
    sender: broadcast::Sender<()>,
    shutdown_initiated: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    /// Creates a new shutdown coordinator.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender,
            shutdown_initiated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribes to shutdown notifications.
    ///
    /// Returns a receiver that will receive a message when shutdown is initiated.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Creates a signal that resolves when shutdown is initiated.
    ///
    /// Await it through [`ShutdownSignal::wait`]; the resulting future is
    /// what servers that accept a graceful-shutdown future expect.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.sender.subscribe(),
            shutdown_initiated: self.shutdown_initiated.clone(),
        }
    }

    /// Initiates shutdown.
    ///
    /// This notifies all subscribers that shutdown has been initiated.
    pub fn initiate_shutdown(&self) {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Shutdown initiated");
            let _ = self.sender.send(());
        }
    }

    /// Returns true if shutdown has been initiated.
    pub fn is_shutdown_initiated(&self) -> bool {
        self.shutdown_initiated.load(Ordering::SeqCst)
    }

    /// Waits for a shutdown signal (OS signal or manual initiation).
    ///
    /// This method sets up signal handlers and blocks until a shutdown
    /// signal is received, then notifies all subscribers.
    pub async fn wait_for_shutdown(&self) {
        // Already shutdown?
        if self.shutdown_initiated.load(Ordering::SeqCst) {
            return;
        }

        // Wait for OS signal
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm =
                signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
            let mut sigint =
                signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");
            let mut sigquit = signal(SignalKind::quit()).expect("Failed to register SIGQUIT handler");

            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM");
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT");
                }
                _ = sigquit.recv() => {
                    info!("Received SIGQUIT");
                }
            }
        }

        #[cfg(windows)]
        {
            use tokio::signal::ctrl_c;

            ctrl_c().await.expect("Failed to register Ctrl+C handler");
            info!("Received Ctrl+C");
        }

        // Mark as shutdown and notify subscribers
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let _ = self.sender.send(());
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ShutdownSignal
// =============================================================================

/// A handle that resolves once shutdown is signaled.
///
/// Consume it with [`wait`](Self::wait); the returned future can be passed
/// to APIs that expect a shutdown future (like axum's
/// `with_graceful_shutdown`). Holding the receiver inside an async fn keeps
/// the broadcast waiter registered across polls, so the wakeup is never lost
/// on an otherwise idle server.
pub struct ShutdownSignal {
    receiver: broadcast::Receiver<()>,
    shutdown_initiated: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Waits for the shutdown signal.
    pub async fn wait(mut self) {
        // Check if already shutdown
        if self.shutdown_initiated.load(Ordering::SeqCst) {
            return;
        }

        // A RecvError means the coordinator was dropped, which also ends
        // the wait.
        let _ = self.receiver.recv().await;
    }
}

// =============================================================================
// Tests
// =============================================================================
