// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use steward_api::ApiConfig;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    // Check if file exists
    if !config_path.exists() {
        return Err(BinError::Configuration(format!(
            "Configuration file not found: {}",
            config_path.display()
        )));
    }

    // Load and validate configuration
    let config = ApiConfig::load(config_path)
        .map_err(|e| BinError::Configuration(format!("Configuration parsing failed: {}", e)))?;
    config
        .validate()
        .map_err(|e| BinError::Configuration(format!("Configuration validation failed: {}", e)))?;

    // Collect validation warnings
    let mut warnings: Vec<String> = Vec::new();

    if config.tokens.access_secret.len() < 32 {
        warnings.push("Access token secret is shorter than recommended (32 bytes)".to_string());
    }
    if config.tokens.refresh_secret.len() < 32 {
        warnings.push("Refresh token secret is shorter than recommended (32 bytes)".to_string());
    }
    if config.bootstrap_admin.is_none() {
        warnings.push(
            "No bootstrap admin configured; a fresh credential store has no ADMIN account"
                .to_string(),
        );
    }
    if config.cors.allows_any_origin() && config.cors.allow_credentials {
        warnings.push("allow_credentials is ignored while any origin is allowed".to_string());
    }

    let origins = if config.cors.allows_any_origin() {
        "* (any)".to_string()
    } else {
        config.cors.allowed_origins.join(", ")
    };

    // Output results based on format
    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Bind:            {}", config.socket_addr());
            println!("  Base path:       {}", config.base_path);
            println!("  Allowed origins: {}", origins);
            println!("  Access TTL:      {}s", config.tokens.access_ttl_secs);
            println!("  Refresh TTL:     {}s", config.tokens.refresh_ttl_secs);
            println!(
                "  Bootstrap admin: {}",
                config
                    .bootstrap_admin
                    .as_ref()
                    .map(|admin| admin.email.clone())
                    .unwrap_or_else(|| "not configured".to_string())
            );

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                // Secrets carry #[serde(skip_serializing)], so the dump never
                // leaks them.
                println!(
                    "{}",
                    serde_yaml::to_string(&config)
                        .unwrap_or_else(|_| "(serialization error)".to_string())
                );
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "bind": config.socket_addr().to_string(),
                    "base_path": config.base_path,
                    "allowed_origins": config.cors.allowed_origins,
                    "allow_credentials": config.cors.allow_credentials,
                    "access_ttl_secs": config.tokens.access_ttl_secs,
                    "refresh_ttl_secs": config.tokens.refresh_ttl_secs,
                    "bootstrap_admin": config.bootstrap_admin.as_ref().map(|admin| &admin.email),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
        }
        OutputFormat::Yaml => {
            // Simple YAML-like format
            println!("valid: true");
            println!("config_path: {}", config_path.display());
            println!("bind: {}", config.socket_addr());
            println!("base_path: {}", config.base_path);
            println!("access_ttl_secs: {}", config.tokens.access_ttl_secs);
            println!("refresh_ttl_secs: {}", config.tokens.refresh_ttl_secs);
            println!("bootstrap_admin: {}", config.bootstrap_admin.is_some());
            if !warnings.is_empty() {
                println!("warnings:");
                for warning in &warnings {
                    println!("  - {}", warning);
                }
            }
        }
    }

    // In strict mode, treat warnings as errors
    if args.strict && !warnings.is_empty() {
        return Err(BinError::Configuration(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}
