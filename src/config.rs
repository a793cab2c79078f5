//! Configuration Management
//!
//! Handles persistent client configuration for dao-client.

use crate::api::schema::SchemaVersion;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Request timeout applied when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Header carrying the internal-service secret on internal calls
pub const DEFAULT_INTERNAL_TOKEN_HEADER: &str = "X-Internal-Token";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Public API host, e.g. `api.daocloud.io` or `https://api.daocloud.io`
    #[serde(default)]
    pub host: Option<String>,
    /// Internal API host used for privileged calls such as login
    #[serde(default)]
    pub internal_host: Option<String>,
    /// Internal-service secret sent on internal calls
    #[serde(default)]
    pub internal_token: Option<String>,
    /// Header name for the internal-service secret
    #[serde(default)]
    pub internal_token_header: Option<String>,
    /// Stored auth token, sent verbatim in `Authorization`
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Wire schema generation of the target platform
    #[serde(default)]
    pub schema: SchemaVersion,
    /// Request timeout in seconds, `0` disables it
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Configuration pointing at a public host with everything else defaulted
    pub fn new(host: &str) -> Self {
        Self {
            host: Some(host.to_string()),
            ..Self::default()
        }
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dao").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        Self::load_from(&path)
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Apply `DAO_*` environment variables on top of the loaded values
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(host) = env_var("DAO_HOST") {
            self.host = Some(host);
        }
        if let Some(token) = env_var("DAO_AUTH_TOKEN") {
            self.auth_token = Some(token);
        }
        if let Some(host) = env_var("DAO_INTERNAL_HOST") {
            self.internal_host = Some(host);
        }
        if let Some(token) = env_var("DAO_INTERNAL_TOKEN") {
            self.internal_token = Some(token);
        }
        if let Some(schema) = env_var("DAO_SCHEMA") {
            self.schema = schema
                .parse()
                .with_context(|| format!("Invalid DAO_SCHEMA value: {}", schema))?;
        }
        Ok(self)
    }

    /// Effective request timeout (config > default), `None` when disabled
    pub fn effective_timeout(&self) -> Option<Duration> {
        match self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Effective internal token header name
    pub fn effective_internal_token_header(&self) -> &str {
        self.internal_token_header
            .as_deref()
            .unwrap_or(DEFAULT_INTERNAL_TOKEN_HEADER)
    }

    /// Set the auth token and save
    pub fn set_auth_token(&mut self, token: &str) -> Result<()> {
        self.auth_token = Some(token.to_string());
        self.save()
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
