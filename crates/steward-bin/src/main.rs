// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Entry point for the `steward` binary.

use steward_bin::cli::Cli;
use steward_bin::error::report_error_and_exit;
use steward_bin::{commands, logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    logging::init_logging(cli.effective_log_level(), cli.log_format);

    if let Err(error) = commands::execute(cli).await {
        report_error_and_exit(error);
    }
}
