// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use tracing::info;

use crate::cli::{Cli, RunArgs};
use crate::error::BinResult;
use crate::runtime::RuntimeBuilder;

/// Executes the `run` command to start the API server.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    info!("Starting Steward...");

    // Build the runtime, letting CLI flags override the bind address
    let mut builder = RuntimeBuilder::new().config_path(&cli.config);
    if let Some(host) = args.host {
        builder = builder.host(host);
    }
    if let Some(port) = args.port {
        builder = builder.port(port);
    }

    // Serve until a shutdown signal arrives
    builder.build()?.run().await
}
