//! Gateway settings
//!
//! # Hierarchy
//!
//! Settings are resolved in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. TOML file given with `--config`
//! 3. Environment variables: `MARCUS_*`
//! 4. CLI flags (`marcus serve --bind ... --es-url ...`)
//!
//! # Example
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0:8080"
//! cors_origin = "https://marcus.uib.no"
//!
//! [elasticsearch]
//! url = "http://localhost:9200"
//! timeout_secs = 10
//!
//! [search]
//! fuzzify = "*"
//! default_indices = ["marcus", "admin"]
//! suggest_size = 5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::fuzzify::FuzzyMode;
use crate::result::Result;

pub const ENV_BIND_ADDRESS: &str = "MARCUS_BIND_ADDRESS";
pub const ENV_ES_URL: &str = "MARCUS_ES_URL";
pub const ENV_FUZZIFY: &str = "MARCUS_FUZZIFY";

// ═══════════════════════════════════════════════════════════════════════════
// SETTINGS STRUCTURES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub elasticsearch: ElasticsearchSettings,
    pub search: SearchSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
    /// Allowed CORS origin; `None` allows any origin.
    pub cors_origin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticsearchSettings {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Operator appended to query tokens, if any.
    pub fuzzify: Option<FuzzyMode>,
    /// Indices searched when a request names none.
    pub default_indices: Vec<String>,
    pub suggest_size: u64,
}

// ═══════════════════════════════════════════════════════════════════════════
// DEFAULT IMPLEMENTATIONS
// ═══════════════════════════════════════════════════════════════════════════

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            cors_origin: None,
        }
    }
}

impl Default for ElasticsearchSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            fuzzify: None,
            default_indices: Vec::new(),
            suggest_size: 5,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// LOADING
// ═══════════════════════════════════════════════════════════════════════════

impl Settings {
    /// Parse settings from TOML text. Missing sections and keys keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigParseFailed` if the TOML is malformed or a value has the
    /// wrong type.
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content).map_err(|e| Error::ConfigParseFailed {
            reason: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML is malformed or fails validation
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config_read_failed(path, e.to_string()))?;
        debug!("Loaded settings from {}", path.display());
        Self::from_toml(&content)
    }

    /// Apply `MARCUS_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if an override has an invalid value.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply `MARCUS_*` overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns error if an override has an invalid value.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_BIND_ADDRESS) {
            self.server.bind_address = value;
        }

        if let Some(value) = lookup(ENV_ES_URL) {
            self.elasticsearch.url = value;
        }

        // an empty value switches fuzzification off
        if let Some(value) = lookup(ENV_FUZZIFY) {
            self.search.fuzzify = if value.trim().is_empty() {
                None
            } else {
                Some(value.parse().map_err(|_| {
                    Error::ConfigParseFailed {
                        reason: format!("invalid {ENV_FUZZIFY} value '{value}', expected '*' or '~'"),
                    }
                })?)
            };
        }

        self.validate()
    }

    /// Validate settings values
    ///
    /// # Errors
    ///
    /// Returns error if any values are out of range or invalid
    fn validate(&self) -> Result<()> {
        if self.server.bind_address.trim().is_empty() {
            return Err(Error::ConfigParseFailed {
                reason: "server.bind_address must not be empty".to_string(),
            });
        }
        if url::Url::parse(&self.elasticsearch.url).is_err() {
            return Err(Error::ConfigParseFailed {
                reason: format!("elasticsearch.url '{}' is not a URL", self.elasticsearch.url),
            });
        }
        if self.elasticsearch.timeout_secs == 0 {
            return Err(Error::ConfigParseFailed {
                reason: "elasticsearch.timeout_secs must be positive".to_string(),
            });
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════
