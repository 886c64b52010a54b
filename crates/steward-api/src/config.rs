// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server configuration.
//!
//! Deserialized from YAML with every field defaulted, so a partial file is
//! always valid. Token secrets can be supplied through the environment
//! instead of the file; `validate()` rejects a configuration whose secrets
//! are missing or still the sample placeholder.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::TokenConfig;
use crate::error::{ApiError, ApiResult};

/// Environment variable overriding `tokens.access_secret`.
pub const ENV_ACCESS_SECRET: &str = "STEWARD_ACCESS_SECRET";

/// Environment variable overriding `tokens.refresh_secret`.
pub const ENV_REFRESH_SECRET: &str = "STEWARD_REFRESH_SECRET";

/// Secret value shipped in the sample configuration file.
const PLACEHOLDER_SECRET: &str = "change-me";

// =============================================================================
// ApiConfig
// =============================================================================

/// Configuration for the API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// Base path for API endpoints.
    pub base_path: String,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Token signing configuration.
    pub tokens: TokenConfig,
    /// Request timeout.
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    /// Graceful shutdown timeout.
    #[serde(with = "duration_secs")]
    pub shutdown_timeout: Duration,
    /// Administrator account seeded at startup, if configured.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            base_path: "/api".to_string(),
            cors: CorsConfig::default(),
            tokens: TokenConfig::default(),
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
            bootstrap_admin: None,
        }
    }
}

impl ApiConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// Environment overrides are applied after parsing; validation is the
    /// caller's step so tests can assemble intentionally-broken configs.
    pub fn load(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApiError::internal(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let mut config: ApiConfig = serde_yaml::from_str(&content).map_err(|e| {
            ApiError::internal(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        config.apply_env_overrides();

        Ok(config)
    }

    /// Applies environment variable overrides for token secrets.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var(ENV_ACCESS_SECRET) {
            if !secret.is_empty() {
                self.tokens.access_secret = secret;
            }
        }
        if let Ok(secret) = std::env::var(ENV_REFRESH_SECRET) {
            if !secret.is_empty() {
                self.tokens.refresh_secret = secret;
            }
        }
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the token configuration.
    pub fn with_tokens(mut self, tokens: TokenConfig) -> Self {
        self.tokens = tokens;
        self
    }

    /// Sets the bootstrap administrator.
    pub fn with_bootstrap_admin(mut self, admin: BootstrapAdmin) -> Self {
        self.bootstrap_admin = Some(admin);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        if self.base_path.is_empty() || !self.base_path.starts_with('/') {
            return Err(ApiError::internal(format!(
                "Base path must start with '/': {:?}",
                self.base_path
            )));
        }
        if self.tokens.access_secret == PLACEHOLDER_SECRET
            || self.tokens.refresh_secret == PLACEHOLDER_SECRET
        {
            return Err(ApiError::internal(
                "Token secrets are still the sample placeholder",
            ));
        }
        self.tokens.validate()?;

        if let Some(admin) = &self.bootstrap_admin {
            admin.validate()?;
        }

        Ok(())
    }
}

// =============================================================================
// CorsConfig
// =============================================================================

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins; `"*"` allows any.
    pub allowed_origins: Vec<String>,
    /// Whether to allow credentials. Ignored when any origin is allowed,
    /// since the two are mutually exclusive on the wire.
    pub allow_credentials: bool,
    /// Max age for preflight cache (seconds).
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: false,
            max_age: 3600,
        }
    }
}

impl CorsConfig {
    /// Creates a permissive configuration for development.
    pub fn permissive() -> Self {
        Self::default()
    }

    /// Creates a restrictive configuration for production.
    pub fn strict(origins: Vec<String>) -> Self {
        Self {
            allowed_origins: origins,
            allow_credentials: true,
            max_age: 3600,
        }
    }

    /// Returns `true` if any origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}

// =============================================================================
// BootstrapAdmin
// =============================================================================

/// Administrator account seeded into the credential store at startup.
///
/// A fresh deployment needs one ADMIN capable of registering further users;
/// seeding is idempotent, so an existing account with this email is left
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Initial plaintext password.
    #[serde(skip_serializing)]
    pub password: String,
}

impl BootstrapAdmin {
    /// Creates a bootstrap account definition.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    fn validate(&self) -> ApiResult<()> {
        if self.name.is_empty() || self.email.is_empty() || self.password.is_empty() {
            return Err(ApiError::internal(
                "Bootstrap admin requires name, email, and password",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// duration_secs module for Duration
// =============================================================================

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_tokens() -> TokenConfig {
        TokenConfig::new(
            "access-secret-that-is-long-enough-for-tests",
            "refresh-secret-that-is-long-enough-for-tests",
        )
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_path, "/api");
        assert!(config.bootstrap_admin.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig::default().with_port(9000);
        assert_eq!(config.socket_addr().port(), 9000);
    }

    #[test]
    fn test_validate_rejects_missing_secrets() {
        assert!(ApiConfig::default().validate().is_err());
    }

    #[test]
    fn test_validate_rejects_placeholder_secrets() {
        let mut config = ApiConfig::default().with_tokens(valid_tokens());
        config.tokens.access_secret = PLACEHOLDER_SECRET.to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_real_secrets() {
        let config = ApiConfig::default().with_tokens(valid_tokens());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_incomplete_bootstrap_admin() {
        let config = ApiConfig::default()
            .with_tokens(valid_tokens())
            .with_bootstrap_admin(BootstrapAdmin::new("Root", "root@example.com", ""));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_parses_with_defaults() {
        let config: ApiConfig = serde_yaml::from_str("port: 9090\n").unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.base_path, "/api");
    }

    #[test]
    fn test_yaml_bootstrap_admin_block() {
        let yaml = r#"
bootstrap_admin:
  name: Root
  email: root@example.com
  password: s3cret
"#;
        let config: ApiConfig = serde_yaml::from_str(yaml).unwrap();
        let admin = config.bootstrap_admin.unwrap();
        assert_eq!(admin.email, "root@example.com");
        assert_eq!(admin.password, "s3cret");
    }

    #[test]
    fn test_secrets_not_serialized() {
        let config = ApiConfig::default().with_tokens(valid_tokens());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("access-secret-that-is-long-enough-for-tests"));
        assert!(!yaml.contains("refresh-secret-that-is-long-enough-for-tests"));
    }

    #[test]
    fn test_cors_defaults() {
        let cors = CorsConfig::default();
        assert!(cors.allows_any_origin());
        assert!(!cors.allow_credentials);

        let strict = CorsConfig::strict(vec!["https://steward.example.com".to_string()]);
        assert!(!strict.allows_any_origin());
        assert!(strict.allow_credentials);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("steward.yaml");
        std::fs::write(
            &path,
            "port: 8181\ntokens:\n  issuer: test-steward\n",
        )
        .unwrap();

        let config = ApiConfig::load(&path).unwrap();
        assert_eq!(config.port, 8181);
        assert_eq!(config.tokens.issuer, "test-steward");

        assert!(ApiConfig::load(dir.path().join("missing.yaml")).is_err());
    }
}
