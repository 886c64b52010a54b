// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Executes the `version` command to display version information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("Steward - role-based project management service");
    println!();
    println!("Version Information:");
    println!("  steward-bin:  {}", env!("CARGO_PKG_VERSION"));
    println!("  steward-core: {}", steward_core::VERSION);
    println!("  steward-api:  {}", steward_api::VERSION);
    println!();
    println!("Build Information:");
    println!("  Rust Edition: 2021");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");
    println!();
    println!("For commercial licensing, contact: contact@sylvex.io");

    Ok(())
}
